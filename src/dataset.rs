use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

#[derive(Debug, Deserialize)]
struct PlayerDocument {
    players: Vec<RawPlayer>,
}

#[derive(Debug, Deserialize)]
pub struct RawPlayer {
    #[serde(rename = "Player")]
    pub player: String,
    #[serde(rename = "Change", default)]
    pub change: Option<String>,
}

#[derive(Debug, Serialize, Copy, Clone, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum BarColor {
    Green,
    Red,
}

impl BarColor {
    // Zero change is treated as non-positive and stays red.
    pub fn from_change(change: f64) -> Self {
        if change > 0.0 { Self::Green } else { Self::Red }
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct PlayerRecord {
    pub player: String,
    pub change: f64,
    pub color: BarColor,
}

#[derive(Debug)]
pub struct CleanReport {
    pub records: Vec<PlayerRecord>,
    pub dropped: usize,
}

pub async fn load_players(path: &Path) -> Result<Vec<RawPlayer>> {
    let body = fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let document: PlayerDocument = serde_json::from_str(&body)
        .with_context(|| format!("failed to parse player dataset {}", path.display()))?;
    Ok(document.players)
}

pub fn clean_players(raw: Vec<RawPlayer>, limit: usize) -> CleanReport {
    let total = raw.len();
    let mut records: Vec<PlayerRecord> = raw
        .into_iter()
        .filter_map(|entry| {
            let change = entry.change.as_deref().and_then(parse_percent)?;
            Some(PlayerRecord {
                color: BarColor::from_change(change),
                player: entry.player,
                change,
            })
        })
        .collect();
    let dropped = total - records.len();
    records.truncate(limit);
    CleanReport { records, dropped }
}

pub fn parse_percent(value: &str) -> Option<f64> {
    let mut buf = String::with_capacity(value.len());
    let mut saw_digit = false;
    let mut saw_decimal = false;

    for ch in value.chars() {
        match ch {
            '0'..='9' => {
                buf.push(ch);
                saw_digit = true;
            }
            '.' | ',' => {
                if saw_decimal {
                    return None;
                }
                buf.push('.');
                saw_decimal = true;
            }
            '-' | '\u{2212}' | '\u{2013}' | '\u{2014}' => {
                if !buf.is_empty() {
                    return None;
                }
                buf.push('-');
            }
            '+' | '%' | ' ' | '\t' | '\n' | '\r' | '\u{00a0}' | '\u{202f}' => {}
            // Anything else makes the value malformed, not merely noisy.
            _ => return None,
        }
    }

    if !saw_digit {
        return None;
    }

    buf.parse::<f64>().ok().filter(|parsed| parsed.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn raw(player: &str, change: Option<&str>) -> RawPlayer {
        RawPlayer {
            player: player.to_string(),
            change: change.map(str::to_string),
        }
    }

    #[test]
    fn parse_percent_strips_suffix() {
        assert_eq!(parse_percent("12.3%"), Some(12.3));
        assert_eq!(parse_percent("-4%"), Some(-4.0));
        assert_eq!(parse_percent("+3.5%"), Some(3.5));
    }

    #[test]
    fn parse_percent_tolerates_unicode_minus_and_spaces() {
        assert_eq!(parse_percent("\u{2212}2.0 %"), Some(-2.0));
        assert_eq!(parse_percent("1\u{00a0}234,5%"), Some(1234.5));
    }

    #[test]
    fn parse_percent_rejects_non_numeric() {
        assert_eq!(parse_percent("N/A"), None);
        assert_eq!(parse_percent(""), None);
        assert_eq!(parse_percent("%"), None);
        assert_eq!(parse_percent("--"), None);
    }

    #[test]
    fn parse_percent_rejects_malformed_numbers() {
        assert_eq!(parse_percent("12abc%"), None);
        assert_eq!(parse_percent("1.2.3%"), None);
        assert_eq!(parse_percent("1-2%"), None);
        assert_eq!(parse_percent("1,2,3%"), None);
    }

    #[test]
    fn clean_keeps_only_parseable_changes() {
        let report = clean_players(
            vec![
                raw("A", Some("12.3%")),
                raw("B", Some("-4%")),
                raw("C", Some("N/A")),
                raw("D", None),
            ],
            50,
        );
        assert_eq!(report.dropped, 2);
        let names: Vec<&str> = report
            .records
            .iter()
            .map(|record| record.player.as_str())
            .collect();
        assert_eq!(names, ["A", "B"]);
        assert_eq!(report.records[0].color, BarColor::Green);
        assert_eq!(report.records[1].color, BarColor::Red);
    }

    #[test]
    fn zero_change_is_red() {
        let report = clean_players(vec![raw("A", Some("0%"))], 50);
        assert_eq!(report.records[0].color, BarColor::Red);
    }

    #[test]
    fn clean_truncates_after_filtering() {
        let report = clean_players(
            vec![
                raw("A", Some("bad")),
                raw("B", Some("1%")),
                raw("C", Some("2%")),
                raw("D", Some("3%")),
            ],
            2,
        );
        // The unparseable record does not consume a slot.
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.records[0].player, "B");
        assert_eq!(report.records[1].player, "C");
        assert_eq!(report.dropped, 1);
    }

    #[test]
    fn clean_preserves_source_order() {
        let report = clean_players(
            vec![raw("Z", Some("-1%")), raw("A", Some("5%"))],
            50,
        );
        assert_eq!(report.records[0].player, "Z");
        assert_eq!(report.records[1].player, "A");
    }

    #[tokio::test]
    async fn load_players_reads_document() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{"players":[{{"Player":"A","Change":"12.3%","Salary":"1m"}},{{"Player":"B","Change":"N/A"}}]}}"#
        )
        .expect("write dataset");

        let players = load_players(file.path()).await.expect("load dataset");
        assert_eq!(players.len(), 2);
        assert_eq!(players[0].player, "A");
        assert_eq!(players[0].change.as_deref(), Some("12.3%"));
    }

    #[tokio::test]
    async fn load_players_fails_on_missing_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let error = load_players(&dir.path().join("absent.json"))
            .await
            .expect_err("missing file must fail");
        assert!(error.to_string().contains("absent.json"));
    }

    #[tokio::test]
    async fn load_players_fails_on_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "{{not json").expect("write dataset");
        assert!(load_players(file.path()).await.is_err());
    }
}
