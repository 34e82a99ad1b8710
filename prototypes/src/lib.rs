//! Synthetic inputs shared by the benchmarks.

const OWNERS: [&str; 3] = ["root", "alice", "build"];
const MONTHS: [&str; 4] = ["Jan", "Apr", "Jul", "Oct"];

/// An `ls -l` style listing of `lines` entries. Every fourth entry is a
/// directory, every third an executable, and every tenth line is a
/// `total` header that a listing parser has to skip.
pub fn synthetic_listing(lines: usize) -> String {
    let mut out = String::with_capacity(lines * 64);
    for i in 0..lines {
        if i % 10 == 0 {
            out.push_str(&format!("total {}\n", i * 4));
            continue;
        }
        let mode = if i % 4 == 0 {
            "drwxr-xr-x"
        } else if i % 3 == 0 {
            "-rwxr-xr-x"
        } else {
            "-rw-r--r--"
        };
        let owner = OWNERS[i % OWNERS.len()];
        out.push_str(&format!(
            "{mode} {} {owner} staff {} {} {} {:02}:{:02} file {i}.dat\n",
            1 + i % 3,
            i * 137,
            MONTHS[i % MONTHS.len()],
            1 + i % 28,
            i % 24,
            i % 60,
        ));
    }
    out
}

/// A small namespaced XML document padded to roughly `bytes` long.
pub fn synthetic_prescription(bytes: usize) -> String {
    let mut out = String::from(
        "<?xml version=\"1.0\"?>\n<xpd:prescription xmlns:xpd=\"http://example.com/2011/xpd\">\n\
         <xpd:doctor>Dr. Bench</xpd:doctor>\n<xpd:patient>Pat Ient</xpd:patient>\n",
    );
    let mut n = 0;
    while out.len() < bytes {
        out.push_str(&format!("<xpd:note>line {n}</xpd:note>\n"));
        n += 1;
    }
    out.push_str("</xpd:prescription>\n");
    out
}
