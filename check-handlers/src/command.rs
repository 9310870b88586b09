//! Command-line parsing of chat messages: `/name[@bot] arg1 arg2 ...`.

use dbot_core::HandlerError;

/// Commands the bot answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    CheckOsagoVin,
    CheckOsagoReg,
    CheckFines,
    FinePhoto,
}

impl Command {
    /// Maps a command name (without the leading `/`) to a [`Command`].
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "start" => Some(Self::Start),
            "help" => Some(Self::Help),
            "check_osago_vin" => Some(Self::CheckOsagoVin),
            "check_osago_reg" => Some(Self::CheckOsagoReg),
            "check_fines" => Some(Self::CheckFines),
            "fine_photo" => Some(Self::FinePhoto),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Help => "help",
            Self::CheckOsagoVin => "check_osago_vin",
            Self::CheckOsagoReg => "check_osago_reg",
            Self::CheckFines => "check_fines",
            Self::FinePhoto => "fine_photo",
        }
    }

    /// Exact number of arguments the command takes; `None` means arguments are ignored.
    pub fn arity(&self) -> Option<usize> {
        match self {
            Self::Start | Self::Help => None,
            Self::CheckOsagoVin | Self::CheckOsagoReg => Some(1),
            Self::CheckFines => Some(2),
            Self::FinePhoto => Some(4),
        }
    }
}

/// A message split into command name and whitespace-separated arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    /// Lower-cased name without `/` and without an `@botname` suffix.
    pub name: String,
    /// Bot named in the `@botname` suffix, if any.
    pub addressee: Option<String>,
    pub args: Vec<String>,
}

impl ParsedCommand {
    /// Parses `text`; fails with [`HandlerError::NoText`] for blank text and
    /// [`HandlerError::InvalidCommand`] when the text is not a command.
    pub fn parse(text: &str) -> Result<Self, HandlerError> {
        let mut tokens = text.split_whitespace();
        let head = tokens.next().ok_or(HandlerError::NoText)?;
        let name = head
            .strip_prefix('/')
            .ok_or_else(|| HandlerError::InvalidCommand(head.to_string()))?;
        let (name, addressee) = match name.split_once('@') {
            Some((name, addressee)) => (name, Some(addressee).filter(|a| !a.is_empty())),
            None => (name, None),
        };
        if name.is_empty() {
            return Err(HandlerError::InvalidCommand(head.to_string()));
        }
        Ok(Self {
            name: name.to_lowercase(),
            addressee: addressee.map(str::to_string),
            args: tokens.map(str::to_string).collect(),
        })
    }

    /// True unless the command names another bot. Usernames compare case-insensitively; with
    /// the bot's own username unknown, every command is taken as ours.
    pub fn is_addressed_to(&self, bot_username: Option<&str>) -> bool {
        match (self.addressee.as_deref(), bot_username) {
            (Some(addressee), Some(own)) => {
                addressee.eq_ignore_ascii_case(own.trim_start_matches('@'))
            }
            _ => true,
        }
    }

    pub fn command(&self) -> Option<Command> {
        Command::from_name(&self.name)
    }
}
