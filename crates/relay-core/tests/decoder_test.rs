use relay_core::line::decode_datagram;
use relay_core::{Decoder, DecoderRegistry};
use serde_json::{json, Value};

fn parse(output: &str) -> Value {
    serde_json::from_str(output).expect("decoder output should be JSON")
}

// ============ STORMSHIELD TESTS ============

#[test]
fn test_stormshield_filter_log() {
    let decoder = Decoder::stormshield().unwrap();

    let raw = r#"<134>id=firewall time="2024-01-01" src=10.1.1.1 dst=10.1.1.2 action=block logtype=filter"#;
    let output = decoder.process(raw);
    let value = parse(&output);

    assert_eq!(value["integration"], "stormshield");
    let fields = &value["stormshield"];
    assert_eq!(fields["srcip"], "10.1.1.1");
    assert_eq!(fields["dstip"], "10.1.1.2");
    assert_eq!(fields["action"], "block");
    assert_eq!(fields["logtype"], "filter");
    assert_eq!(fields["time"], "2024-01-01");
    // contact address mirrors the source when nothing else set it
    assert_eq!(fields["address"], "10.1.1.1");
}

#[test]
fn test_stormshield_round_trip_fields() {
    let decoder = Decoder::stormshield().unwrap();

    let raw = r#"id=firewall fw="SN310A" tz=+0100 src=192.168.0.10 srcport=51234 dst=8.8.8.8 dstport=53 proto=dns rulename="allow dns out" sent=120 rcvd=240 logtype=connection"#;
    let value = parse(&decoder.process(raw));

    let expected = json!({
        "integration": "stormshield",
        "stormshield": {
            "id": "firewall",
            "fw": "SN310A",
            "tz": "+0100",
            "srcip": "192.168.0.10",
            "srcport": "51234",
            "dstip": "8.8.8.8",
            "dstport": "53",
            "proto": "dns",
            "rulename": "allow dns out",
            "sent": "120",
            "rcvd": "240",
            "logtype": "connection",
            "address": "192.168.0.10"
        }
    });
    assert_eq!(value, expected);
}

#[test]
fn test_stormshield_admin_intervention() {
    let decoder = Decoder::stormshield().unwrap();

    let raw = r#"id=firewall src=192.168.1.254 user=admin logtype=system msg="Login by administrative intervention (10.0.0.5)""#;
    let value = parse(&decoder.process(raw));

    assert_eq!(value["stormshield"]["address"], "10.0.0.5");
    assert_eq!(value["stormshield"]["srcip"], "10.0.0.5");
}

#[test]
fn test_stormshield_output_keeps_field_order() {
    let decoder = Decoder::stormshield().unwrap();
    let output = decoder.process("id=firewall src=1.1.1.1 dst=2.2.2.2 action=pass");
    assert_eq!(
        output,
        r#"{"integration":"stormshield","stormshield":{"id":"firewall","srcip":"1.1.1.1","dstip":"2.2.2.2","action":"pass","address":"1.1.1.1"}}"#
    );
}

// ============ SYNOLOGY TESTS ============

#[test]
fn test_synology_connection() {
    let decoder = Decoder::synology().unwrap();

    let raw = r"Connection: User [CORP\jdoe] from [host(10.2.2.2)] via [SMB] accessed shared folder [data.]";
    let value = parse(&decoder.process(raw));

    assert_eq!(value["integration"], "synology");
    let fields = &value["synology"];
    assert_eq!(fields["type"], "connection");
    assert_eq!(fields["user"], "jdoe");
    assert_eq!(fields["domain"], "CORP");
    assert_eq!(fields["srcip"], "10.2.2.2");
    assert_eq!(fields["computer"], "host");
    assert_eq!(fields["protocol"], "SMB");
    assert_eq!(fields["share"], "data");
    assert_eq!(fields["action"], "Access");
}

#[test]
fn test_synology_winfile_without_domain() {
    let decoder = Decoder::synology().unwrap();

    let raw = "<14>Jan  1 10:00:00 nas WinFileService Event: delete, Path: /projects/plan.docx, File/Folder: File, Size: 24.50 KB, User: jdoe, IP: 10.0.0.7";
    let value = parse(&decoder.process(raw));

    let fields = &value["synology"];
    assert_eq!(fields["type"], "winfile");
    assert_eq!(fields["action"], "delete");
    assert_eq!(fields["path"], "/projects/plan.docx");
    assert_eq!(fields["filetype"], "File");
    assert_eq!(fields["size"], "24.50 KB");
    assert_eq!(fields["user"], "jdoe");
    assert_eq!(fields["srcip"], "10.0.0.7");
    assert!(fields.get("domain").is_none());
}

#[test]
fn test_synology_filestation() {
    let decoder = Decoder::synology().unwrap();

    let raw = r"FileStation Event: upload, Path: /share/b.pdf, Size: 2048 Bytes, User: LAB\alice, IP: 10.0.0.8";
    let value = parse(&decoder.process(raw));

    let fields = &value["synology"];
    assert_eq!(fields["type"], "filestation");
    assert_eq!(fields["size"], "2048");
    assert_eq!(fields["user"], "alice");
    assert_eq!(fields["domain"], "LAB");
}

// ============ PASS-THROUGH TESTS ============

#[test]
fn test_unmatched_line_passes_through() {
    let registry = DecoderRegistry::with_builtin().unwrap();
    let raw = "random unrelated syslog text";

    for vendor in registry.vendors() {
        let decoder = registry.get(vendor).unwrap();
        assert_eq!(decoder.process(raw), raw);
    }
}

#[test]
fn test_cross_vendor_lines_pass_through() {
    let stormshield = Decoder::stormshield().unwrap();
    let synology = Decoder::synology().unwrap();

    let nas = r"Connection: User [jdoe] from [pc(10.0.0.1)] via [AFP] accessed shared folder [home]";
    let fw = "id=firewall src=1.1.1.1";
    assert_eq!(stormshield.process(nas), nas);
    assert_eq!(synology.process(fw), fw);
}

#[test]
fn test_total_on_odd_input() {
    let registry = DecoderRegistry::with_builtin().unwrap();
    let garbage = decode_datagram(&[0xff, 0x00, 0xfe, b'=', b'"', 0x80]);
    let huge = format!("id=firewall {}", "k=v ".repeat(20_000));
    let wide: String = (0..8_000).fold("id=firewall".to_string(), |mut line, i| {
        line.push_str(&format!(" k{}=v", i));
        line
    });
    let inputs = [
        "",
        "=",
        "\"\"\"",
        "id=firewall",
        garbage.as_str(),
        huge.as_str(),
        wide.as_str(),
    ];

    for vendor in registry.vendors() {
        let decoder = registry.get(vendor).unwrap();
        for input in inputs {
            let output = decoder.process(input);
            assert!(!output.contains('\n'));
            if !decoder.decide(input).is_match() {
                assert_eq!(output, input);
            }
        }
    }
}

#[test]
fn test_lossy_decoded_line_is_relayed() {
    let decoder = Decoder::stormshield().unwrap();
    let line = decode_datagram(b"\xef\xbb\xbfid=firewall user=\xff logtype=auth\n");

    let value = parse(&decoder.process(&line));
    assert_eq!(value["stormshield"]["user"], "\u{fffd}");
    assert_eq!(value["stormshield"]["id"], "firewall");
}

#[test]
fn test_wide_line_keeps_every_distinct_key() {
    let decoder = Decoder::stormshield().unwrap();
    let line: String = (0..8_000).fold("id=firewall".to_string(), |mut line, i| {
        line.push_str(&format!(" k{}=v{}", i, i));
        line
    });

    let envelope = decoder.decode(&line).unwrap();
    // id plus 8000 keys, no srcip so no derived address
    assert_eq!(envelope.fields.get("k0"), Some("v0"));
    assert_eq!(envelope.fields.get("k7999"), Some("v7999"));
    assert_eq!(envelope.fields.iter().nth(1), Some(("k0", "v0")));
    assert_eq!(envelope.fields.len(), 8_001);
}
