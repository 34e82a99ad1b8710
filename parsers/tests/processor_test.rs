use doclens_core::config::AppConfig;
use parsers::processor::PhoneProcessor;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_process_folder_collects_unique_numbers() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("contacts.txt"),
        "Call +1 555-123-4567 or (020) 7946 0958.\nAgain: +1 555-123-4567",
    )
    .unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    fs::write(
        dir.path().join("nested").join("card.xml"),
        r#"<?xml version="1.0"?><card><phone>555.987.6543</phone><fax>12 34</fax></card>"#,
    )
    .unwrap();
    fs::write(dir.path().join("broken.xml"), r#"<?xml version="1.0"?><root><open>"#).unwrap();

    doclens_core::init_tracing();
    let mut processor = PhoneProcessor::new();
    processor.process_folder(dir.path());

    assert_eq!(processor.successful_files(), 2);
    assert_eq!(processor.failed_files(), 1);
    let numbers: Vec<&str> = processor.phone_numbers().iter().map(String::as_str).collect();
    assert_eq!(numbers, ["+15551234567", "02079460958", "5559876543"]);
}

#[test]
fn test_process_single_file_returns_its_numbers() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("memo.txt");
    fs::write(&path, "Front desk: 020 7946 0958, short 123-45").unwrap();

    let mut processor = PhoneProcessor::default();
    let found = processor.process(&path).unwrap();

    assert_eq!(found, ["02079460958"]);
    assert!(processor.phone_numbers().contains("02079460958"));
}

#[test]
fn test_missing_file_reports_context() {
    let dir = tempdir().unwrap();
    let mut processor = PhoneProcessor::new();
    let err = processor.process(&dir.path().join("absent.txt")).unwrap_err();
    assert!(format!("{:#}", err).contains("absent.txt"));
}

#[test]
fn test_missing_folder_is_not_fatal() {
    let dir = tempdir().unwrap();
    let mut processor = PhoneProcessor::new();
    processor.process_folder(&dir.path().join("nowhere"));

    assert_eq!(processor.successful_files(), 0);
    assert_eq!(processor.failed_files(), 0);
    assert!(processor.phone_numbers().is_empty());
}

#[test]
fn test_min_digits_from_config() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("short.txt"), "desk 555-123-4567").unwrap();

    let mut config = AppConfig::default();
    config.phone.min_digits = 11;
    let mut processor = PhoneProcessor::from_config(&config);
    processor.process_folder(dir.path());

    assert_eq!(processor.successful_files(), 1);
    assert!(processor.phone_numbers().is_empty());
}

#[test]
fn test_identical_files_are_processed_once() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "Office 020 7946 0958").unwrap();
    fs::write(dir.path().join("b.txt"), "Office 020 7946 0958").unwrap();
    fs::write(dir.path().join("c.txt"), "Mobile 555-987-6543").unwrap();

    let mut processor = PhoneProcessor::new();
    processor.process_folder(dir.path());

    assert_eq!(processor.successful_files(), 2);
    assert_eq!(processor.duplicate_files(), 1);
    assert_eq!(processor.phone_numbers().len(), 2);
}

#[test]
fn test_copies_of_a_broken_file_each_fail() {
    let dir = tempdir().unwrap();
    let broken = r#"<?xml version="1.0"?><root><open>"#;
    fs::write(dir.path().join("first.xml"), broken).unwrap();
    fs::write(dir.path().join("second.xml"), broken).unwrap();

    let mut processor = PhoneProcessor::new();
    processor.process_folder(dir.path());

    assert_eq!(processor.failed_files(), 2);
    assert_eq!(processor.duplicate_files(), 0);
    assert_eq!(processor.successful_files(), 0);
}
