//! In-chat operator commands (`!quiz on QuizBot`, `!roam log`, ...).

/// Top-level command word, decided before argument parsing so that master-only
/// commands from other users can be dropped silently
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Help,
    Join,
    Quiz,
    Delay,
    Cycle,
    Roam,
}

impl CommandKind {
    pub fn from_word(word: &str) -> Option<Self> {
        match word.to_lowercase().as_str() {
            "help" => Some(Self::Help),
            "j" | "join" => Some(Self::Join),
            "quiz" => Some(Self::Quiz),
            "delay" => Some(Self::Delay),
            "cycle" => Some(Self::Cycle),
            "roam" => Some(Self::Roam),
            _ => None,
        }
    }

    pub fn requires_master(&self) -> bool {
        !matches!(self, Self::Help | Self::Join)
    }

    pub fn usage(&self) -> &'static str {
        match self {
            Self::Help => "Usage: `!help`",
            Self::Join => "Usage: `!j <room>`",
            Self::Quiz => "Usage: `!quiz on <bot_username>`, `!quiz off` or `!quiz status`",
            Self::Delay => "Usage: `!delay` or `!delay <min_ms> <max_ms>`",
            Self::Cycle => "Usage: `!cycle on`, `!cycle off` or `!cycle status`",
            Self::Roam => "Usage: `!roam on|off|status|log|now`",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizAction {
    On { bot: String },
    Off,
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayAction {
    Show,
    Set { min_ms: u64, max_ms: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleAction {
    On,
    Off,
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoamAction {
    On,
    Off,
    Status,
    Log,
    Now,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Join { room: String },
    Quiz(QuizAction),
    Delay(DelayAction),
    Cycle(CycleAction),
    Roam(RoamAction),
}

/// Why a `!` message did not become a [`Command`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandParseError {
    /// Not `!`-prefixed, or an unknown command word
    NotACommand,
    /// Known command with bad arguments; the usage text is echoed back
    Usage(&'static str),
}

/// A `!` message split into its command word and arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub kind: CommandKind,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn parse(text: &str) -> Result<Self, CommandParseError> {
        let body = text
            .trim()
            .strip_prefix('!')
            .ok_or(CommandParseError::NotACommand)?;
        let mut parts = split_args(body).into_iter();
        let word = parts.next().ok_or(CommandParseError::NotACommand)?;
        let kind = CommandKind::from_word(&word).ok_or(CommandParseError::NotACommand)?;
        Ok(Self {
            kind,
            args: parts.collect(),
        })
    }

    /// Turn the arguments into a concrete command
    pub fn into_command(self) -> Result<Command, CommandParseError> {
        let usage = CommandParseError::Usage(self.kind.usage());
        let sub = self.args.first().map(|arg| arg.to_lowercase());

        match self.kind {
            CommandKind::Help => Ok(Command::Help),
            CommandKind::Join => {
                if self.args.is_empty() {
                    return Err(usage);
                }
                Ok(Command::Join {
                    room: self.args.join(" "),
                })
            }
            CommandKind::Quiz => match sub.as_deref() {
                Some("on") => self
                    .args
                    .get(1)
                    .map(|bot| Command::Quiz(QuizAction::On { bot: bot.clone() }))
                    .ok_or(usage),
                Some("off") => Ok(Command::Quiz(QuizAction::Off)),
                Some("status") => Ok(Command::Quiz(QuizAction::Status)),
                _ => Err(usage),
            },
            CommandKind::Delay => match self.args.as_slice() {
                [] => Ok(Command::Delay(DelayAction::Show)),
                [min, max] => match (min.parse::<u64>(), max.parse::<u64>()) {
                    (Ok(min_ms), Ok(max_ms)) if min_ms <= max_ms => {
                        Ok(Command::Delay(DelayAction::Set { min_ms, max_ms }))
                    }
                    _ => Err(usage),
                },
                _ => Err(usage),
            },
            CommandKind::Cycle => match sub.as_deref() {
                Some("on") => Ok(Command::Cycle(CycleAction::On)),
                Some("off") => Ok(Command::Cycle(CycleAction::Off)),
                Some("status") | None => Ok(Command::Cycle(CycleAction::Status)),
                _ => Err(usage),
            },
            CommandKind::Roam => match sub.as_deref() {
                Some("on") => Ok(Command::Roam(RoamAction::On)),
                Some("off") => Ok(Command::Roam(RoamAction::Off)),
                Some("status") | None => Ok(Command::Roam(RoamAction::Status)),
                Some("log") => Ok(Command::Roam(RoamAction::Log)),
                Some("now") => Ok(Command::Roam(RoamAction::Now)),
                _ => Err(usage),
            },
        }
    }
}

/// Split arguments shell-style: whitespace separated, with single/double quotes
/// and backslash escapes. Unbalanced quotes fall back to a plain whitespace split.
pub fn split_args(input: &str) -> Vec<String> {
    quoted_split(input).unwrap_or_else(|| input.split_whitespace().map(String::from).collect())
}

fn quoted_split(input: &str) -> Option<Vec<String>> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('"'), '\\') => current.push(chars.next()?),
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                in_token = true;
            }
            (None, '\\') => {
                current.push(chars.next()?);
                in_token = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_token {
                    args.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if quote.is_some() {
        return None;
    }
    if in_token {
        args.push(current);
    }
    Some(args)
}
