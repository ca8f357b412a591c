// Stormshield firewall dialect (WELF key=value)
// <134>id=firewall time="2024-01-01 10:00:00" fw="SN310" src=10.1.1.1 dst=10.1.1.2 action=block logtype=filter

use super::{AliasTable, Dialect, DialectRule, Membership};
use crate::classify::{Category, Classifier};
use crate::error::PatternError;
use crate::normalize::NormalizeStep;

pub const VENDOR: &str = "stormshield";

/// Every Stormshield log carries this pair.
pub const DISCRIMINATOR: &str = "id=firewall";

/// key=value or key="quoted value"
pub const WELF_PATTERN: &str = r#"(\w+)=(?:"([^"]*)"|(\S+))"#;

/// Admin login messages carry the client address in the message body
pub const ADMIN_IP_PATTERN: &str = r"administrative intervention \((\d+\.\d+\.\d+\.\d+)\)";

/// WELF key -> field name sent downstream
pub const FIELD_ALIASES: &[(&str, &str)] = &[
    ("time", "time"),
    ("fw", "fw"),
    ("tz", "tz"),
    ("startime", "startime"),
    ("pri", "pri"),
    ("confid", "confid"),
    ("slotlevel", "slotlevel"),
    ("ruleid", "ruleid"),
    ("rulename", "rulename"),
    ("srcif", "srcif"),
    ("srcifname", "srcifname"),
    ("dstif", "dstif"),
    ("dstifname", "dstifname"),
    ("ipproto", "ipproto"),
    ("proto", "proto"),
    ("src", "srcip"),
    ("srcport", "srcport"),
    ("srcportname", "srcportname"),
    ("srcname", "srcname"),
    ("srcmac", "srcmac"),
    ("srccontinent", "srccontinent"),
    ("srccountry", "srccountry"),
    ("srchostrep", "srchostrep"),
    ("dst", "dstip"),
    ("dstport", "dstport"),
    ("dstportname", "dstportname"),
    ("dstname", "dstname"),
    ("dstcontinent", "dstcontinent"),
    ("dstcountry", "dstcountry"),
    ("dsthostrep", "dsthostrep"),
    ("dstiprep", "dstiprep"),
    ("modsrc", "modsrc"),
    ("modsrcport", "modsrcport"),
    ("origdst", "origdst"),
    ("origdstport", "origdstport"),
    ("ipv", "ipv"),
    ("action", "action"),
    ("msg", "msg"),
    ("class", "class"),
    ("classification", "classification"),
    ("alarmid", "alarmid"),
    ("target", "target"),
    ("risk", "risk"),
    ("sensible", "sensible"),
    ("sent", "sent"),
    ("rcvd", "rcvd"),
    ("duration", "duration"),
    ("logtype", "logtype"),
    ("user", "user"),
    ("address", "address"),
    ("sessionid", "sessionid"),
    ("method", "method"),
    ("domain", "domain"),
    ("error", "error"),
    ("totp", "totp"),
    ("tunnel", "tunnel"),
    ("phase", "phase"),
    ("vpntype", "vpntype"),
    ("icmptype", "icmptype"),
    ("icmpcode", "icmpcode"),
];

pub fn dialect() -> Result<Dialect, PatternError> {
    let classifier = Classifier::new("logtype")
        .rule("alarm", Category::Alarm)
        .rule("auth", Category::Auth)
        .rule("vpn", Category::Vpn)
        .rule("server", Category::AdminSession)
        .rule_when("system", "msg", "administrative", Category::Login)
        .rule("connection", Category::Connection)
        .rule("filter", Category::Connection);

    Ok(Dialect::new(VENDOR, Membership::Token(DISCRIMINATOR), classifier)
        .rule(DialectRule::key_value(
            "welf",
            WELF_PATTERN,
            AliasTable::new(FIELD_ALIASES),
        )?)
        .step(NormalizeStep::admin_address(
            "msg",
            "address",
            "srcip",
            ADMIN_IP_PATTERN,
        )?))
}
