//! Start screen: collects the display name and background colour.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

use huddle_shared::{BackgroundColor, SessionParams, SharedError};

/// Build session parameters from the two answers. A blank colour picks the
/// default background.
pub fn parse_answers(name: &str, color: &str) -> Result<SessionParams, SharedError> {
    let color = if color.trim().is_empty() {
        BackgroundColor::default()
    } else {
        color.parse()?
    };
    SessionParams::new(name, color, None)
}

/// Ask until the answers are valid. Returns `None` if input ends first.
pub async fn prompt<R>(lines: &mut Lines<R>) -> std::io::Result<Option<SessionParams>>
where
    R: AsyncBufRead + Unpin,
{
    let palette: Vec<&str> = BackgroundColor::ALL.iter().map(|c| c.name()).collect();

    loop {
        println!("Your name:");
        let Some(name) = lines.next_line().await? else {
            return Ok(None);
        };
        println!("Background colour ({}) [{}]:", palette.join(", "), BackgroundColor::default());
        let Some(color) = lines.next_line().await? else {
            return Ok(None);
        };

        match parse_answers(&name, &color) {
            Ok(params) => return Ok(Some(params)),
            Err(e) => println!("{e}"),
        }
    }
}
