// Synology NAS dialect (free text, one rule per subsystem)

use super::{Dialect, DialectRule, Membership};
use crate::classify::{Category, Classifier};
use crate::error::PatternError;
use crate::normalize::NormalizeStep;

pub const VENDOR: &str = "synology";

// WinFileService Event: write, Path: /share/a.txt, File/Folder: File, Size: 12 KB, User: CORP\jdoe, IP: 10.0.0.7
const WINFILE_PATTERN: &str = r"WinFileService Event: (\w+), Path: ([^,]+), File/Folder: ([^,]+), Size: ([^,]+), User: ([^,]+), IP: ([\d.]+)";

// Connection: User [CORP\jdoe] from [host(10.2.2.2)] via [SMB] accessed shared folder [data.]
const CONNECTION_PATTERN: &str = r"Connection: User \[([^\]]+)\] from \[([^(]+)\(([^)]+)\)\] via \[([^\]]+)\] accessed shared folder \[([^\]]+)\]";

// FileStation Event: upload, Path: /share/b.pdf, Size: 2048 Bytes, User: jdoe, IP: 10.0.0.8
const FILESTATION_PATTERN: &str = r"FileStation Event: (\w+), Path: (\S+), Size: (\d+) Bytes, User: ([^,]+), IP: ([\d.]+)";

/// Rules in priority order. Each one targets a different subsystem so at most
/// one of them can match a given line.
pub fn rules() -> Result<Vec<DialectRule>, PatternError> {
    Ok(vec![
        DialectRule::positional(
            "winfile",
            WINFILE_PATTERN,
            &["action", "path", "filetype", "size", "user", "srcip"],
        )?
        .with_tag("type", "winfile"),
        DialectRule::positional(
            "connection",
            CONNECTION_PATTERN,
            &["user", "computer", "srcip", "protocol", "share"],
        )?
        .with_tag("type", "connection")
        .with_tag("action", "Access"),
        DialectRule::positional(
            "filestation",
            FILESTATION_PATTERN,
            &["action", "path", "size", "user", "srcip"],
        )?
        .with_tag("type", "filestation"),
    ])
}

pub fn dialect() -> Result<Dialect, PatternError> {
    let classifier = Classifier::new("type")
        .rule("winfile", Category::FileTransfer)
        .rule("connection", Category::FileShare)
        .rule("filestation", Category::FileTransfer);

    let mut dialect = Dialect::new(VENDOR, Membership::FirstMatch, classifier)
        .step(NormalizeStep::TrimWhitespace)
        .step(NormalizeStep::SplitIdentity {
            field: "user",
            domain: "domain",
            separator: '\\',
        })
        .step(NormalizeStep::StripTrailing {
            field: "share",
            chars: &['.'],
        });
    for rule in rules()? {
        dialect = dialect.rule(rule);
    }
    Ok(dialect)
}
