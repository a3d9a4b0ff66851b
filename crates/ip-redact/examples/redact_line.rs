use anyhow::Result;
use bstr::ByteSlice;
use ip_redact::{AddressMatcher, LineSanitizer, SanitizePolicy};

fn main() -> Result<()> {
    let matcher = AddressMatcher::new()?;

    let input: &[&[u8]] = &[
        b"[09:14:02] [Server thread/INFO]: Steve[/203.0.113.42:51234] logged in",
        b"[09:14:05] [Server thread/INFO]: Starting remote control listener on [fe80::1%eth0]",
        b"[09:14:07] [Server thread/INFO]: Done (3.481s)! For help, type \"help\"",
    ];

    for (name, policy) in [
        ("omit", SanitizePolicy::Omit),
        ("replace", SanitizePolicy::Replace("<redacted>".into())),
    ] {
        println!("--- {name} ---");
        let sanitizer = LineSanitizer::new(&matcher, policy);
        for line in input {
            for range in matcher.find_ipv4(line).chain(matcher.find_ipv6(line)) {
                println!("  found {} at {:?}", line[range.clone()].as_bstr(), range);
            }
            match sanitizer.sanitize(line) {
                Some(clean) => println!("{}", clean.as_bstr()),
                None => println!("  (line dropped)"),
            }
        }
    }

    Ok(())
}
