//! Challenge stream parser
//!
//! Certbot in `--manual` mode announces each DNS-01 challenge over several
//! lines: the record name, an instruction line, then the value to publish.
//! Blank lines may appear anywhere in between.
//!
//! ```text
//! Please deploy a DNS TXT record under the name:
//!
//! _acme-challenge.test.example.com.
//!
//! with the following value:
//!
//! 6hB3dNqO4Vt0n6Gx1Zr0Ew8pU2YlBo1cH3JxQm5sKaE
//! ```

use crate::types::ChallengeEvent;

/// Substring identifying a line that carries a challenge record name.
pub const RECORD_NAME_MARKER: &str = "_acme-challenge";

/// Substring of the line announcing that the token follows.
pub const VALUE_MARKER: &str = "with the following value:";

/// Link prefix certbot prints in front of the record name in its DNS lookup hint.
const ADMIN_TOOLBOX_PREFIX: &str = "Admin Toolbox: https://toolbox.googleapps.com/apps/dig/#TXT/";

/// Parser position within a challenge announcement.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ParserState {
    #[default]
    ExpectingName,
    /// A record name was seen; waiting for the value instruction.
    ExpectingInstruction { name: String },
    /// The instruction was seen; the next significant line is the token.
    ExpectingValue { name: String },
}

/// Incremental parser over the ACME client's standard output.
///
/// One instance per attempt. Feeding is infallible: lines that mean nothing in
/// the current state are ignored.
#[derive(Debug, Default)]
pub struct ChallengeParser {
    state: ParserState,
}

impl ChallengeParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ParserState {
        &self.state
    }

    /// Consume one line, returning an event when it completes an announcement.
    pub fn feed(&mut self, line: &str) -> Option<ChallengeEvent> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        match std::mem::take(&mut self.state) {
            ParserState::ExpectingValue { name } => {
                log::trace!("challenge value for {name} received");
                return Some(ChallengeEvent {
                    record_name: name,
                    token: line.to_string(),
                });
            }
            ParserState::ExpectingInstruction { name } if line.contains(VALUE_MARKER) => {
                self.state = ParserState::ExpectingValue { name };
            }
            previous => {
                self.state = if line.contains(RECORD_NAME_MARKER) {
                    ParserState::ExpectingInstruction {
                        name: extract_record_name(line),
                    }
                } else {
                    previous
                };
            }
        }

        None
    }
}

/// Strip the lookup-tool link and one trailing root dot from a name line.
fn extract_record_name(line: &str) -> String {
    let name = line.replace(ADMIN_TOOLBOX_PREFIX, "");
    let name = name.trim();
    name.strip_suffix('.').unwrap_or(name).to_string()
}

/// Run a fresh parser over `lines`, collecting every event in order.
pub fn parse_lines<I, S>(lines: I) -> Vec<ChallengeEvent>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parser = ChallengeParser::new();
    lines
        .into_iter()
        .filter_map(|line| parser.feed(line.as_ref()))
        .collect()
}
