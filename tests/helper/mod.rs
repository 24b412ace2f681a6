use std::fs;

use bolt::compile;
use bolt::constants::common::BOLT_EXT;

const PATH_TO_TEST_FILES: &str = "static/test_files";
const EXPECTED_FILE: &str = "output.s";

pub fn test_with(test_name: &str) {
    let path_to_test = format!("{PATH_TO_TEST_FILES}/{test_name}");

    let files = fs::read_dir(&path_to_test)
        .unwrap()
        .map(Result::unwrap)
        .map(|entry| (entry.file_name().to_string_lossy().into_owned(), entry.path()))
        .collect::<Vec<_>>();
    let (_, expected) = files
        .iter()
        .find(|(filename, _)| filename == EXPECTED_FILE)
        .unwrap();
    let expected = fs::read_to_string(expected).unwrap();

    let program = files
        .iter()
        .find(|(filename, _)| filename.ends_with(BOLT_EXT))
        .map(|(_, file)| fs::read_to_string(file).unwrap())
        .unwrap();

    test_output(&program, &expected);
}

fn test_output(source_code: &str, expected: &str) {
    match compile(source_code) {
        Ok(module) => assert_eq!(module.trim_end(), expected.trim_end()),
        Err(e) => e.report(),
    }
}

pub fn test_error(source_code: &str, expected: &str) {
    let error = compile(source_code).unwrap_err();
    assert_eq!(error.to_string(), expected);
}
