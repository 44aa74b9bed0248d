//! Line-oriented intents read from stdin.

use anyhow::{Context, Result, anyhow, bail};
use foundation::{CountryCode, SentimentBucket};
use runtime::{Key, KeyEvent, Modifiers};

pub const HELP: &str = "\
commands:
  select <CC>        select a country by ISO code
  clear              deselect (panel closes, selection drops after the delay)
  filter <bucket>    toggle positive|neutral|negative
  click <x> <y>      click the globe at a viewport position
  hover <x> <y>      move the pointer; `hover off` leaves the viewport
  resize <w> <h>     set the viewport size in pixels
  hours <n>          set the trend window
  key <name>         send a key: esc, enter, f5, r, ctrl+r, cmd+r
  focus              the window regained focus
  refresh            refetch global sentiment now
  view               print the current dashboard
  quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Select(CountryCode),
    Clear,
    Filter(SentimentBucket),
    Click([f64; 2]),
    Hover(Option<[f64; 2]>),
    Resize([f64; 2]),
    TrendHours(u32),
    Key(KeyEvent),
    Focus,
    Refresh,
    View,
    Help,
    Quit,
}

/// Blank lines yield `None`.
pub fn parse(line: &str) -> Result<Option<Intent>> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();
    let intent = match (command.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("select", [code]) => Intent::Select(CountryCode::parse(code)?),
        ("clear", []) => Intent::Clear,
        ("filter", [bucket]) => Intent::Filter(parse_bucket(bucket)?),
        ("click", [x, y]) => Intent::Click(parse_point(x, y)?),
        ("hover", ["off"]) => Intent::Hover(None),
        ("hover", [x, y]) => Intent::Hover(Some(parse_point(x, y)?)),
        ("resize", [w, h]) => Intent::Resize(parse_point(w, h)?),
        ("hours", [n]) => Intent::TrendHours(n.parse().with_context(|| format!("bad hour count {n:?}"))?),
        ("key", [name]) => Intent::Key(parse_key(name)?),
        ("focus", []) => Intent::Focus,
        ("refresh", []) => Intent::Refresh,
        ("view", []) => Intent::View,
        ("help" | "?", []) => Intent::Help,
        ("quit" | "exit" | "q", []) => Intent::Quit,
        _ => bail!("unrecognized command {line:?} (try `help`)"),
    };
    Ok(Some(intent))
}

fn parse_bucket(raw: &str) -> Result<SentimentBucket> {
    SentimentBucket::ALL
        .into_iter()
        .find(|b| b.as_str().eq_ignore_ascii_case(raw))
        .ok_or_else(|| anyhow!("unknown bucket {raw:?}"))
}

fn parse_point(x: &str, y: &str) -> Result<[f64; 2]> {
    let x = x.parse().with_context(|| format!("bad coordinate {x:?}"))?;
    let y = y.parse().with_context(|| format!("bad coordinate {y:?}"))?;
    Ok([x, y])
}

fn parse_key(raw: &str) -> Result<KeyEvent> {
    let lower = raw.to_ascii_lowercase();
    let mut modifiers = Modifiers::NONE;
    let mut parts: Vec<&str> = lower.split('+').collect();
    let Some(key) = parts.pop() else {
        bail!("empty key");
    };
    for m in parts {
        match m {
            "ctrl" => modifiers.ctrl = true,
            "cmd" | "meta" => modifiers.meta = true,
            "alt" => modifiers.alt = true,
            "shift" => modifiers.shift = true,
            other => bail!("unknown modifier {other:?}"),
        }
    }
    let key = match key {
        "esc" | "escape" => Key::Escape,
        "enter" | "return" => Key::Enter,
        f if f.len() > 1 && f.starts_with('f') => {
            Key::Function(f[1..].parse().with_context(|| format!("bad function key {raw:?}"))?)
        }
        c => {
            let mut chars = c.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) if modifiers.shift => Key::Char(ch.to_ascii_uppercase()),
                (Some(ch), None) => Key::Char(ch),
                _ => bail!("unknown key {raw:?}"),
            }
        }
    };
    Ok(KeyEvent::with_modifiers(key, modifiers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_selection_commands() {
        assert_eq!(
            parse("select jp").unwrap(),
            Some(Intent::Select(CountryCode::parse("JP").unwrap()))
        );
        assert_eq!(parse("  clear ").unwrap(), Some(Intent::Clear));
        assert_eq!(parse("").unwrap(), None);
        assert!(parse("select").is_err());
        assert!(parse("select JPN").is_err());
    }

    #[test]
    fn parses_buckets_case_insensitively() {
        assert_eq!(
            parse("filter Negative").unwrap(),
            Some(Intent::Filter(SentimentBucket::Negative))
        );
        assert!(parse("filter mixed").is_err());
    }

    #[test]
    fn parses_pointer_commands() {
        assert_eq!(parse("click 10 20.5").unwrap(), Some(Intent::Click([10.0, 20.5])));
        assert_eq!(parse("hover off").unwrap(), Some(Intent::Hover(None)));
        assert_eq!(parse("resize 390 844").unwrap(), Some(Intent::Resize([390.0, 844.0])));
        assert!(parse("click ten 20").is_err());
    }

    #[test]
    fn parses_keys_with_modifiers() {
        assert_eq!(parse("key esc").unwrap(), Some(Intent::Key(KeyEvent::plain(Key::Escape))));
        assert_eq!(
            parse("key f5").unwrap(),
            Some(Intent::Key(KeyEvent::plain(Key::Function(5))))
        );
        let Some(Intent::Key(ctrl_r)) = parse("key ctrl+r").unwrap() else {
            panic!("expected a key intent");
        };
        assert_eq!(ctrl_r.key, Key::Char('r'));
        assert!(ctrl_r.modifiers.ctrl);
        let Some(Intent::Key(shift_r)) = parse("key shift+r").unwrap() else {
            panic!("expected a key intent");
        };
        assert_eq!(shift_r.key, Key::Char('R'));
        assert!(parse("key hyper+r").is_err());
        assert!(parse("key backspace").is_err());
    }

    #[test]
    fn unknown_commands_are_errors() {
        assert!(parse("spin faster").is_err());
        assert_eq!(parse("q").unwrap(), Some(Intent::Quit));
    }
}
