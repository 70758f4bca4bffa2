pub fn format_change(value: f64) -> String {
    if value == value.trunc() {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

pub fn format_change_percent(value: f64) -> String {
    format!("{}%", format_change(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_numbers_keep_one_decimal() {
        assert_eq!(format_change(-4.0), "-4.0");
        assert_eq!(format_change(0.0), "0.0");
    }

    #[test]
    fn fractional_values_print_as_is() {
        assert_eq!(format_change(12.3), "12.3");
        assert_eq!(format_change(-0.25), "-0.25");
    }

    #[test]
    fn percent_suffix() {
        assert_eq!(format_change_percent(12.3), "12.3%");
        assert_eq!(format_change_percent(-4.0), "-4.0%");
    }
}
