use anyhow::{Context, Result, anyhow, bail};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Scan,
    List,
    Recover { message_id: String },
    Clear,
    Deal { shares: u32, threshold: u32, plaintext: String },
}

pub const USAGE: &str = "usage: shardkeep [scan | list | recover <message-id> | clear | deal <shares> <threshold> <plaintext>]";

impl Command {
    /// Parse positional arguments, program name excluded.
    pub fn parse(args: &[String]) -> Result<Self> {
        let mut args = args.iter().map(String::as_str);
        let command = match args.next() {
            None | Some("scan") => Self::Scan,
            Some("list") => Self::List,
            Some("clear") => Self::Clear,
            Some("recover") => Self::Recover {
                message_id: args.next().ok_or_else(|| anyhow!("recover needs a message id"))?.to_string(),
            },
            Some("deal") => {
                let shares = number(args.next(), "shares")?;
                let threshold = number(args.next(), "threshold")?;
                let plaintext = args.next().ok_or_else(|| anyhow!("deal needs a plaintext"))?.to_string();
                Self::Deal {
                    shares,
                    threshold,
                    plaintext,
                }
            }
            Some(other) => bail!("unknown command `{}`", other),
        };

        if let Some(extra) = args.next() {
            bail!("unexpected argument `{}`", extra);
        }
        Ok(command)
    }
}

fn number(arg: Option<&str>, name: &str) -> Result<u32> {
    let arg = arg.ok_or_else(|| anyhow!("deal needs <{}>", name))?;
    arg.parse().with_context(|| format!("<{}> must be a positive integer, got `{}`", name, arg))
}
