use doclens_core::config::ListingConfig;
use doclens_core::handler::IgnoreContentHandler;
use doclens_core::{MetadataKey, MetadataRecord, ParseContext, ParseError, Parser};
use parsers::{DirectoryListParser, ListingOptions};
use std::io::{self, Read};

const SAMPLE: &str = "\
drwxr-xr-x 2 root root 4096 Jan 1 2020 bin
-rwxr-xr-x 1 root root 1234 Jan 1 2020 run.sh
-rw-r--r-- 1 root root 56 Jan 1 2020 notes.txt
";

fn parse_with(parser: &DirectoryListParser, text: &str) -> Result<MetadataRecord, ParseError> {
    let mut metadata = MetadataRecord::new();
    parser.parse(
        &mut text.as_bytes(),
        &mut IgnoreContentHandler,
        &mut metadata,
        &ParseContext::new(),
    )?;
    Ok(metadata)
}

fn parse(text: &str) -> MetadataRecord {
    parse_with(&DirectoryListParser::new(), text).unwrap()
}

#[test]
fn test_sample_listing() {
    let metadata = parse(SAMPLE);

    assert_eq!(
        metadata.values(MetadataKey::Filename),
        ["bin", "run.sh", "notes.txt"]
    );
    assert_eq!(metadata.get(MetadataKey::NumExecutables), Some("1"));
    assert_eq!(
        metadata.values(MetadataKey::FilePermissions),
        ["drwxr-xr-x", "-rwxr-xr-x", "-rw-r--r--"]
    );
    assert_eq!(metadata.values(MetadataKey::NumHardLinks), ["2", "1", "1"]);
    assert_eq!(metadata.values(MetadataKey::FileOwner), ["root"; 3]);
    assert_eq!(metadata.values(MetadataKey::FileOwnerGroup), ["root"; 3]);
    assert_eq!(metadata.values(MetadataKey::FileSize), ["4096", "1234", "56"]);
    assert_eq!(
        metadata.values(MetadataKey::LastModifiedDate),
        ["Jan 1 2020"; 3]
    );
    assert_eq!(metadata.values(MetadataKey::NumExecutables).len(), 1);
}

#[test]
fn test_key_order_follows_first_entry() {
    let metadata = parse(SAMPLE);
    let names: Vec<&str> = metadata.names().collect();
    assert_eq!(
        names,
        [
            "FilePermissions",
            "NumHardLinks",
            "FileOwner",
            "FileOwnerGroup",
            "FileSize",
            "LastModifiedDate",
            "Filename",
        ]
    );
}

#[test]
fn test_short_line_adds_nothing() {
    let metadata = parse("foo bar baz qux quux\n");
    assert!(metadata.is_empty());
}

#[test]
fn test_empty_input_gives_empty_record() {
    let metadata = parse("");
    assert!(metadata.is_empty());
    assert!(!metadata.contains(MetadataKey::NumExecutables));
}

#[test]
fn test_no_executables_means_no_counter() {
    let metadata = parse("-rw-r--r-- 1 a b 1 Jan 1 2020 x\ndrwxr-xr-x 2 a b 1 Jan 1 2020 y\n");
    assert_eq!(metadata.values(MetadataKey::Filename).len(), 2);
    assert_eq!(metadata.get(MetadataKey::NumExecutables), None);
}

#[test]
fn test_mixed_lines_keep_order_and_count() {
    let text = "\
total 12

-rwxr-xr-x 1 me staff 10 Feb 3 09:00 first tool
junk line
lrwxrwxrwx 1 me staff 7 Feb 3 09:01 link -> first
-rw------- 1 me staff 99 Feb 3 2019 secret
";
    let metadata = parse(text);

    assert_eq!(
        metadata.values(MetadataKey::Filename),
        ["first tool", "link -> first", "secret"]
    );
    // The symlink shows `x` and is counted.
    assert_eq!(metadata.get(MetadataKey::NumExecutables), Some("2"));
    assert_eq!(
        metadata.values(MetadataKey::LastModifiedDate),
        ["Feb 3 09:00", "Feb 3 09:01", "Feb 3 2019"]
    );
}

#[test]
fn test_filename_whitespace_collapses() {
    let metadata = parse("-rw-r--r-- 1 a b 1 Jan 1 2020   spaced \t  out   name  \n");
    assert_eq!(metadata.values(MetadataKey::Filename), ["spaced out name"]);
}

#[test]
fn test_non_ascii_space_stays_in_field() {
    let metadata = parse("-rw-r--r-- 1 a b 1 Jan 1 2020 my\u{a0}file\n");
    assert_eq!(metadata.values(MetadataKey::Filename), ["my\u{a0}file"]);

    // Only seven ASCII-separated tokens, so the line is skipped.
    let metadata = parse("-rw-r--r--\u{a0}1 a b 1 Jan 1 2020\n");
    assert!(metadata.is_empty());
}

#[test]
fn test_exactly_eight_tokens_gives_empty_filename() {
    let metadata = parse("-rw-r--r-- 1 a b 1 Jan 1 2020\n");
    assert_eq!(metadata.values(MetadataKey::Filename), [""]);
}

#[test]
fn test_counter_continues_from_existing_value() {
    let mut metadata = MetadataRecord::new();
    metadata.set(MetadataKey::NumExecutables, "4");
    DirectoryListParser::new()
        .parse(
            &mut "-rwxr-xr-x 1 a b 1 Jan 1 2020 x\n".as_bytes(),
            &mut IgnoreContentHandler,
            &mut metadata,
            &ParseContext::new(),
        )
        .unwrap();
    assert_eq!(metadata.get(MetadataKey::NumExecutables), Some("5"));
}

#[test]
fn test_parse_listing_reports_skipped_lines() {
    let parser = DirectoryListParser::new();
    let mut metadata = MetadataRecord::new();
    let listing = "total 8\n\n-rw-r--r-- 1 a b 1 Jan 1 2020 x\nshort\n";
    let report = parser
        .parse_listing(&mut listing.as_bytes(), &mut metadata)
        .unwrap();

    assert_eq!(report.entries, 1);
    assert_eq!(report.skipped_lines, [1, 4]);
}

#[test]
fn test_strict_mode_fails_after_applying_good_lines() {
    let parser = DirectoryListParser::with_options(ListingOptions {
        strict: true,
        ..ListingOptions::default()
    });
    let mut metadata = MetadataRecord::new();
    let err = parser
        .parse(
            &mut "total 8\n-rw-r--r-- 1 a b 1 Jan 1 2020 x\n\n".as_bytes(),
            &mut IgnoreContentHandler,
            &mut metadata,
            &ParseContext::new(),
        )
        .unwrap_err();

    match err {
        ParseError::MalformedLines { line_numbers } => assert_eq!(line_numbers, [1]),
        other => panic!("expected malformed lines, got {:?}", other),
    }
    assert_eq!(metadata.values(MetadataKey::Filename), ["x"]);
}

#[test]
fn test_strict_mode_accepts_clean_listing() {
    let parser = DirectoryListParser::with_options(ListingOptions {
        strict: true,
        ..ListingOptions::default()
    });
    let metadata = parse_with(&parser, SAMPLE).unwrap();
    assert_eq!(metadata.values(MetadataKey::Filename).len(), 3);
}

#[test]
fn test_options_from_config() {
    let config = ListingConfig {
        strict: false,
        date_tokens: 1,
    };
    let parser = DirectoryListParser::with_options(ListingOptions::from(&config));
    assert_eq!(parser.options().min_tokens(), 6);

    let metadata = parse_with(&parser, "-rwxr-x--- 1 a b 3 2024-05-06T07:08 build.sh\n").unwrap();
    assert_eq!(metadata.values(MetadataKey::LastModifiedDate), ["2024-05-06T07:08"]);
    assert_eq!(metadata.values(MetadataKey::Filename), ["build.sh"]);
    assert_eq!(metadata.get(MetadataKey::NumExecutables), Some("1"));
}

#[test]
fn test_supported_type_is_plain_text() {
    let types = DirectoryListParser::new().supported_types(&ParseContext::new());
    assert_eq!(types.len(), 1);
    assert_eq!(types[0].to_string(), "text/plain");
}

struct BrokenReader;

impl Read for BrokenReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Other, "disk gone"))
    }
}

#[test]
fn test_read_failure_propagates() {
    let mut metadata = MetadataRecord::new();
    let err = DirectoryListParser::new()
        .parse(
            &mut BrokenReader,
            &mut IgnoreContentHandler,
            &mut metadata,
            &ParseContext::new(),
        )
        .unwrap_err();
    assert!(matches!(err, ParseError::Io(_)));
    assert!(metadata.is_empty());
}

#[test]
fn test_invalid_utf8_is_a_read_failure() {
    let mut metadata = MetadataRecord::new();
    let result = DirectoryListParser::new().parse(
        &mut &b"-rw-r--r-- 1 a b 1 Jan 1 2020 \xff\xfe\n"[..],
        &mut IgnoreContentHandler,
        &mut metadata,
        &ParseContext::new(),
    );
    assert!(matches!(result, Err(ParseError::Io(_))));
}

#[test]
fn test_filename_count_matches_well_formed_lines() {
    let mut text = String::new();
    let mut well_formed = 0;
    let mut executables = 0;
    for i in 0..50 {
        match i % 4 {
            0 => {
                text.push_str(&format!("-rwxr-xr-x 1 u g {i} Jan {} 2020 exec {i}\n", i % 28 + 1));
                well_formed += 1;
                executables += 1;
            }
            1 => {
                text.push_str(&format!("drwxr-xr-x 3 u g {i} Jan 1 12:00 dir{i}\n"));
                well_formed += 1;
            }
            2 => text.push_str(&format!("short {i}\n")),
            _ => {
                text.push_str(&format!("-rw-r--r-- 1 u g {i} Jan 1 12:00 file{i}.txt\n"));
                well_formed += 1;
            }
        }
    }

    let metadata = parse(&text);
    assert_eq!(metadata.values(MetadataKey::Filename).len(), well_formed);
    assert_eq!(
        metadata.get(MetadataKey::NumExecutables),
        Some(executables.to_string().as_str())
    );
    assert_eq!(metadata.values(MetadataKey::Filename)[0], "exec 0");
    assert_eq!(metadata.values(MetadataKey::Filename)[1], "dir1");
}
