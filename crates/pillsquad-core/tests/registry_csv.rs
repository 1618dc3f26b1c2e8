//! Certified-product registry loaded from CSV files

use pillsquad_core::{CertifiedRegistry, Error, RegistryColumns};
use proptest::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_csv(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_korean_headers() {
    let file = write_csv("번호,제품명,업소명\n1,시아플렉스,A사\n2, 루테인 골드 ,B사\n3,,C사\n");

    let registry = CertifiedRegistry::load(file.path()).unwrap();
    assert_eq!(registry.len(), 2);

    let found = registry.lookup("시아플렉스");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].company_name, "A사");

    assert_eq!(registry.lookup("루테인 골드")[0].product_name, "루테인 골드");
}

#[test]
fn test_load_with_bom_header() {
    let file = write_csv("\u{feff}제품명,업소명\n프로폴리스,D사\n");

    let registry = CertifiedRegistry::load(file.path()).unwrap();
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_load_custom_columns() {
    let file = write_csv("product,company\nOmega Plus,E Corp\n");
    let columns = RegistryColumns {
        product: "product".to_string(),
        company: "company".to_string(),
    };

    let registry = CertifiedRegistry::load_with_columns(file.path(), &columns).unwrap();
    assert_eq!(registry.lookup("omega")[0].company_name, "E Corp");
}

#[test]
fn test_missing_file_is_data_load_error() {
    let err = CertifiedRegistry::load("/nonexistent/data.csv").unwrap_err();
    assert!(matches!(err, Error::DataLoad(_)));
}

#[test]
fn test_missing_column_is_data_load_error() {
    let file = write_csv("제품명,주소\n시아플렉스,서울\n");

    let err = CertifiedRegistry::load(file.path()).unwrap_err();
    assert!(matches!(err, Error::DataLoad(msg) if msg.contains("업소명")));
}

fn product_name() -> impl Strategy<Value = String> {
    "[a-zA-Z가-힣0-9 ]{1,12}"
}

proptest! {
    #[test]
    fn prop_every_product_finds_itself(
        rows in proptest::collection::vec((product_name(), "[a-zA-Z가-힣]{1,6}"), 1..20)
    ) {
        let entries = rows.iter().map(|(p, c)| pillsquad_core::CertifiedProductEntry::new(p.clone(), c.clone()));
        let registry = CertifiedRegistry::from_entries(entries).unwrap();

        for entry in registry.entries() {
            let found = registry.lookup(&entry.product_name);
            prop_assert!(found.iter().any(|e| e.product_name == entry.product_name
                && e.company_name == entry.company_name));
        }
    }

    #[test]
    fn prop_lookup_ignores_ascii_case(
        rows in proptest::collection::vec((product_name(), "[a-z]{1,6}"), 1..20),
        query in "[a-zA-Z]{1,4}"
    ) {
        let entries = rows.iter().map(|(p, c)| pillsquad_core::CertifiedProductEntry::new(p.clone(), c.clone()));
        let registry = CertifiedRegistry::from_entries(entries).unwrap();

        let lower = registry.lookup(&query.to_lowercase());
        let upper = registry.lookup(&query.to_uppercase());
        prop_assert_eq!(lower, upper);
    }
}
