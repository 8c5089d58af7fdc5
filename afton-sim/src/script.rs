use afton::input::Button;
use anyhow::{Context, anyhow, bail};

/// Buttons to hold, and for how many frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hold {
    pub buttons: Button,
    pub frames: usize,
}

fn button(c: char) -> anyhow::Result<Button> {
    Ok(match c {
        'R' => Button::RIGHT,
        'L' => Button::LEFT,
        'U' => Button::UP,
        'D' => Button::DOWN,
        'A' => Button::A,
        'B' => Button::B,
        'S' => Button::START,
        'E' => Button::SELECT,
        _ => bail!("unknown button '{c}'"),
    })
}

/// Parses a comma separated list of `BUTTONS*FRAMES`, for example
/// `R*100,RA*4,-*30`. `-` holds nothing and a missing count means one frame.
pub fn parse(script: &str) -> anyhow::Result<Vec<Hold>> {
    script
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (keys, frames) = match entry.split_once('*') {
                Some((keys, frames)) => (
                    keys,
                    frames
                        .parse::<usize>()
                        .with_context(|| format!("bad frame count in '{entry}'"))?,
                ),
                None => (entry, 1),
            };

            let buttons = if keys == "-" {
                Button::empty()
            } else if keys.is_empty() {
                return Err(anyhow!("no buttons in '{entry}'"));
            } else {
                keys.chars()
                    .map(button)
                    .collect::<anyhow::Result<Vec<_>>>()?
                    .into_iter()
                    .fold(Button::empty(), |all, b| all | b)
            };

            Ok(Hold { buttons, frames })
        })
        .collect()
}

/// The buttons held on each frame, nothing once the script runs out.
pub fn frames(script: &[Hold]) -> impl Iterator<Item = Button> + '_ {
    script
        .iter()
        .flat_map(|hold| std::iter::repeat_n(hold.buttons, hold.frames))
        .chain(std::iter::repeat(Button::empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_holds() {
        let script = parse("R*100, RA*4,-*30,A").unwrap();

        assert_eq!(
            script,
            vec![
                Hold {
                    buttons: Button::RIGHT,
                    frames: 100
                },
                Hold {
                    buttons: Button::RIGHT | Button::A,
                    frames: 4
                },
                Hold {
                    buttons: Button::empty(),
                    frames: 30
                },
                Hold {
                    buttons: Button::A,
                    frames: 1
                },
            ]
        );
    }

    #[test]
    fn empty_script_holds_nothing() {
        assert!(parse("").unwrap().is_empty());
        assert!(frames(&[]).take(10).all(|b| b.is_empty()));
    }

    #[test]
    fn rejects_nonsense() {
        assert!(parse("X*3").is_err());
        assert!(parse("R*lots").is_err());
        assert!(parse("*3").is_err());
    }

    #[test]
    fn expands_to_frames() {
        let script = parse("R*2,A").unwrap();
        let held: Vec<_> = frames(&script).take(4).collect();

        assert_eq!(
            held,
            [Button::RIGHT, Button::RIGHT, Button::A, Button::empty()]
        );
    }
}
