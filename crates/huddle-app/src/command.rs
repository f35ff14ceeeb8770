/// One line typed into the chat screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Say(String),
    Offline,
    Online,
    Quit,
    Unknown(String),
    Blank,
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed {
            "" => Command::Blank,
            "/offline" => Command::Offline,
            "/online" => Command::Online,
            "/quit" | "/exit" => Command::Quit,
            _ if trimmed.starts_with('/') => Command::Unknown(trimmed.to_string()),
            _ => Command::Say(trimmed.to_string()),
        }
    }
}
