use anyhow::{Result, anyhow};
use plotters::coord::Shift;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontDesc, FontFamily, FontStyle, TextStyle};
use std::path::Path;

use crate::dataset::{BarColor, PlayerRecord};
use crate::formatting::format_change_percent;

pub const CHART_TITLE: &str = "Bundesliga Players Market Value Change 2024 vs 2023";
pub const X_AXIS_LABEL: &str = "Market Value Change (in %)";
pub const SOURCE_CREDIT: &str = "Source: Transfermarkt.de & FootsyStats.com";
pub const AUTHOR_CREDIT: &str = "Chart: @EnriqueALopezM";

// 12x8 inches at 300 DPI.
const CHART_WIDTH: u32 = 3600;
const CHART_HEIGHT: u32 = 2400;
const PLOT_BACKGROUND: RGBColor = RGBColor(0xf5, 0xf5, 0xf5);
const GRIDLINE_COLOR: RGBColor = RGBColor(0xb0, 0xb0, 0xb0);
const BAR_GREEN: RGBColor = RGBColor(0x00, 0x80, 0x00);
const BAR_RED: RGBColor = RGBColor(0xff, 0x00, 0x00);

// Data-space gap between a bar end and its value label.
const VALUE_LABEL_OFFSET: f64 = 0.5;
const TARGET_GRIDLINES: usize = 8;

const TITLE_FONT_SIZE: i32 = 64;
const AXIS_FONT_SIZE: f64 = 36.0;
const TICK_FONT_SIZE: f64 = 32.0;
const VALUE_FONT_SIZE: f64 = 36.0;
const NAME_FONT_SIZE: f64 = 24.0;
const AUTHOR_FONT_SIZE: f64 = 50.0;
const SOURCE_FONT_SIZE: f64 = 26.0;
const CREDIT_MARGIN: i32 = 15;

impl BarColor {
    const fn fill(self) -> RGBColor {
        match self {
            Self::Green => BAR_GREEN,
            Self::Red => BAR_RED,
        }
    }
}

pub fn render_chart(records: &[PlayerRecord], output_path: &Path) -> Result<()> {
    if records.is_empty() {
        return Err(anyhow!(
            "no players with a parseable market-value change to draw"
        ));
    }

    let rows = records.len() as f64;
    let (x_min, x_max) = x_bounds(records);

    let root = BitMapBackend::new(output_path, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(CHART_TITLE, ("sans-serif", TITLE_FONT_SIZE))
        .margin(40)
        .x_label_area_size(120)
        .y_label_area_size(20)
        .build_cartesian_2d(x_min..x_max, 0f64..rows)?;

    let plot = chart.plotting_area();
    plot.fill(&PLOT_BACKGROUND)?;

    let ticks = nice_ticks(x_min, x_max, TARGET_GRIDLINES);
    for &tick in &ticks {
        chart.draw_series(DashedLineSeries::new(
            vec![(tick, 0.0), (tick, rows)],
            12,
            9,
            ShapeStyle::from(&GRIDLINE_COLOR.mix(0.7)).stroke_width(3),
        ))?;
    }

    draw_bars(&chart, records, rows)?;
    draw_axis_labels(&chart, &root, &ticks)?;
    draw_credits(&chart, &root)?;

    root.present()?;
    Ok(())
}

fn draw_bars(
    chart: &ChartContext<'_, BitMapBackend<'_>, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    records: &[PlayerRecord],
    rows: f64,
) -> Result<()> {
    let plot = chart.plotting_area();
    let value_font =
        FontDesc::new(FontFamily::SansSerif, VALUE_FONT_SIZE, FontStyle::Bold);
    let name_font = FontDesc::new(FontFamily::SansSerif, NAME_FONT_SIZE, FontStyle::Bold);

    for (row, record) in records.iter().enumerate() {
        // First record at the top of the chart.
        let y_top = rows - row as f64;
        let y_center = y_top - 0.5;
        let bar = Rectangle::new(
            [(0.0, y_top - 0.9), (record.change, y_top - 0.1)],
            record.color.fill().filled(),
        );
        plot.draw(&bar)?;

        let (label_x, label_align) = if record.change > 0.0 {
            (record.change + VALUE_LABEL_OFFSET, HPos::Left)
        } else {
            (record.change - VALUE_LABEL_OFFSET, HPos::Right)
        };
        let value_style = TextStyle::from(value_font.clone())
            .color(&BLACK)
            .pos(Pos::new(label_align, VPos::Center));
        plot.draw(&Text::new(
            format_change_percent(record.change),
            (label_x, y_center),
            value_style,
        ))?;

        let name_style = TextStyle::from(name_font.clone())
            .color(&WHITE)
            .pos(Pos::new(HPos::Center, VPos::Center));
        plot.draw(&Text::new(
            record.player.clone(),
            (record.change / 2.0, y_center),
            name_style,
        ))?;
    }

    Ok(())
}

fn draw_axis_labels(
    chart: &ChartContext<'_, BitMapBackend<'_>, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    root: &DrawingArea<BitMapBackend<'_>, Shift>,
    ticks: &[f64],
) -> Result<()> {
    let tick_style = TextStyle::from(FontDesc::new(
        FontFamily::SansSerif,
        TICK_FONT_SIZE,
        FontStyle::Normal,
    ))
    .color(&BLACK)
    .pos(Pos::new(HPos::Center, VPos::Top));

    let decimals = usize::from(ticks.windows(2).any(|pair| pair[1] - pair[0] < 1.0));
    let mut labels_bottom = 0;
    for &tick in ticks {
        let (x, y) = chart.backend_coord(&(tick, 0.0));
        root.draw(&Text::new(
            format!("{tick:.decimals$}"),
            (x, y + 10),
            tick_style.clone(),
        ))?;
        labels_bottom = labels_bottom.max(y + 10 + TICK_FONT_SIZE as i32);
    }

    let (x_px, _) = chart.plotting_area().get_pixel_range();
    let desc_style = TextStyle::from(FontDesc::new(
        FontFamily::SansSerif,
        AXIS_FONT_SIZE,
        FontStyle::Normal,
    ))
    .color(&BLACK)
    .pos(Pos::new(HPos::Center, VPos::Top));
    root.draw(&Text::new(
        X_AXIS_LABEL,
        ((x_px.start + x_px.end) / 2, labels_bottom + 16),
        desc_style,
    ))?;

    Ok(())
}

fn draw_credits(
    chart: &ChartContext<'_, BitMapBackend<'_>, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    root: &DrawingArea<BitMapBackend<'_>, Shift>,
) -> Result<()> {
    let (x_px, y_px) = chart.plotting_area().get_pixel_range();
    draw_credit_box(
        root,
        AUTHOR_CREDIT,
        AUTHOR_FONT_SIZE,
        x_px.start + CREDIT_MARGIN,
        y_px.end - CREDIT_MARGIN,
        HPos::Left,
    )?;
    draw_credit_box(
        root,
        SOURCE_CREDIT,
        SOURCE_FONT_SIZE,
        x_px.end - CREDIT_MARGIN,
        y_px.end - CREDIT_MARGIN,
        HPos::Right,
    )?;
    Ok(())
}

// Text on a semi-transparent white box, anchored to a bottom corner of the
// plot area.
fn draw_credit_box(
    root: &DrawingArea<BitMapBackend<'_>, Shift>,
    text: &str,
    font_size: f64,
    anchor_x: i32,
    bottom_y: i32,
    align: HPos,
) -> Result<()> {
    let style = TextStyle::from(FontDesc::new(
        FontFamily::SansSerif,
        font_size,
        FontStyle::Normal,
    ))
    .color(&BLACK);
    let (text_w, text_h) = root.estimate_text_size(text, &style)?;
    let pad = (font_size / 2.0) as i32;
    let box_w = text_w as i32 + 2 * pad;
    let box_h = text_h as i32 + 2 * pad;

    let x1 = match align {
        HPos::Right => anchor_x,
        _ => anchor_x + box_w,
    };
    let x0 = x1 - box_w;
    let y1 = bottom_y;
    let y0 = y1 - box_h;

    root.draw(&Rectangle::new(
        [(x0, y0), (x1, y1)],
        WHITE.mix(0.5).filled(),
    ))?;
    root.draw(&Rectangle::new(
        [(x0, y0), (x1, y1)],
        ShapeStyle::from(&BLACK.mix(0.5)).stroke_width(2),
    ))?;
    root.draw(&Text::new(
        text.to_string(),
        (x0 + pad, y0 + pad),
        style.pos(Pos::new(HPos::Left, VPos::Top)),
    ))?;
    Ok(())
}

fn x_bounds(records: &[PlayerRecord]) -> (f64, f64) {
    let mut min = 0.0f64;
    let mut max = 0.0f64;
    for record in records {
        min = min.min(record.change);
        max = max.max(record.change);
    }
    let span = (max - min).max(1.0);
    let pad = span.mul_add(0.12, VALUE_LABEL_OFFSET);
    (min - pad, max + pad)
}

fn nice_ticks(min: f64, max: f64, target: usize) -> Vec<f64> {
    let span = max - min;
    if !span.is_finite() || span <= 0.0 || target == 0 {
        return Vec::new();
    }
    let raw_step = span / target as f64;
    let magnitude = 10f64.powf(raw_step.log10().floor());
    let step = [1.0, 2.0, 5.0, 10.0]
        .into_iter()
        .map(|multiple| multiple * magnitude)
        .find(|&step| span / step <= target as f64)
        .unwrap_or(magnitude * 10.0);

    let mut ticks = Vec::new();
    let mut tick = (min / step).ceil() * step;
    while tick <= max + step * 1e-9 {
        // Snap -0.0 so the label renders without a sign.
        ticks.push(if tick == 0.0 { 0.0 } else { tick });
        tick += step;
    }
    ticks
}
