//! Provisioning target selection: `local`, `multipass:<instance>`, `ssh:<destination>`.

use std::fmt;
use std::str::FromStr;

/// Machine the scripts are provisioned onto.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// The host itself, through `sh -c`.
    Local,
    /// A Multipass instance, through `multipass exec`.
    Multipass { instance: String },
    /// Any host reachable with `ssh`, e.g. `root@10.0.0.5`.
    Ssh { destination: String },
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "local" {
            return Ok(Self::Local);
        }
        let (kind, rest) = s
            .split_once(':')
            .ok_or_else(|| format!("invalid target '{s}': expected local, multipass:<instance> or ssh:<destination>"))?;
        if rest.is_empty() {
            return Err(format!("invalid target '{s}': missing name after '{kind}:'"));
        }
        if rest.starts_with('-') {
            return Err(format!("invalid target '{s}': name cannot start with '-'"));
        }
        match kind {
            "multipass" => Ok(Self::Multipass {
                instance: rest.to_string(),
            }),
            "ssh" => Ok(Self::Ssh {
                destination: rest.to_string(),
            }),
            other => Err(format!("unknown target kind '{other}'")),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Multipass { instance } => write!(f, "multipass:{instance}"),
            Self::Ssh { destination } => write!(f, "ssh:{destination}"),
        }
    }
}
