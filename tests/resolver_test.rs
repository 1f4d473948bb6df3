mod common;

use common::{entity, legacy_entity, write_json, SolutionFixture, TestResult};
use dm8gen::{ModelError, ZoneKind};

fn sales_fixture() -> Result<SolutionFixture, Box<dyn std::error::Error>> {
    let fixture = SolutionFixture::new()?;
    fixture.write_entity(ZoneKind::Raw, "Sales", "Customer", "Customer_DE", &entity("Customer_DE"))?;
    fixture.write_entity(ZoneKind::Stage, "Sales", "Product", "Product", &entity("Product"))?;
    fixture.write_entity(ZoneKind::Core, "Sales", "Product", "Product", &entity("Product"))?;
    Ok(fixture)
}

#[test]
fn lookup_builds_missing_index() -> TestResult {
    let fixture = sales_fixture()?;
    let model = fixture.open()?;
    assert!(!model.index_store().exists());

    let resolved = model.lookup_entity("/stage/Sales/Product/Product")?;
    assert_eq!(resolved.zone, ZoneKind::Stage);
    assert_eq!(resolved.name(), "Product");
    assert_eq!(resolved.document.attributes()[0].name, "Id");
    assert!(model.index_store().exists());
    Ok(())
}

#[test]
fn lookup_ignores_case_and_leading_slash() -> TestResult {
    let fixture = sales_fixture()?;
    let model = fixture.open()?;

    let resolved = model.lookup_entity("raw/sales/customer/customer_de")?;
    assert_eq!(resolved.entry.locator, "/raw/Sales/Customer/Customer_DE");
    assert_eq!(resolved.zone, ZoneKind::Raw);

    // same product/module/entity in two zones stays distinct
    let core = model.lookup_entity("/CORE/Sales/Product/Product")?;
    assert_eq!(core.zone, ZoneKind::Core);
    Ok(())
}

#[test]
fn unknown_and_malformed_locators() -> TestResult {
    let fixture = sales_fixture()?;
    let model = fixture.open()?;

    assert!(matches!(
        model.lookup_entity("/stage/Sales/Product/Price"),
        Err(ModelError::LocatorNotFound(_))
    ));
    for pattern in ["/stage/Sales/Product", "", "/stage/Sales/ /Product"] {
        assert!(
            matches!(model.lookup_entity(pattern), Err(ModelError::InvalidLocator(_))),
            "{:?} should be rejected",
            pattern
        );
    }
    Ok(())
}

#[test]
fn root_locator_needs_a_single_entity() -> TestResult {
    let fixture = sales_fixture()?;
    let model = fixture.open()?;
    match model.lookup_entity("/") {
        Err(ModelError::MultipleLocatorsFound { matches, .. }) => assert_eq!(matches.len(), 3),
        other => panic!("expected ambiguity, got {:?}", other.map(|r| r.entry)),
    }

    let single = SolutionFixture::new()?;
    single.write_entity(ZoneKind::Stage, "Sales", "Product", "Product", &entity("Product"))?;
    let resolved = single.open()?.lookup_entity("/")?;
    assert_eq!(resolved.entry.locator, "/stage/Sales/Product/Product");

    let empty = SolutionFixture::new()?;
    assert!(matches!(
        empty.open()?.lookup_entity("/"),
        Err(ModelError::LocatorNotFound(_))
    ));
    Ok(())
}

#[test]
fn resolved_document_is_rechecked_for_legacy_schema() -> TestResult {
    let fixture = sales_fixture()?;
    let model = fixture.open()?;
    model.validate_index(true)?;

    // rewrite in place with the old per-zone shape, keeping the old timestamp
    let path = fixture.zone_dir(ZoneKind::Core).join("Sales/Product/Product.json");
    write_json(&path, &legacy_entity("core", "Product"))?;
    common::set_mtime(&path, common::hours_ago(2))?;

    match model.lookup_entity("/core/Sales/Product/Product") {
        Err(ModelError::LegacySchemaDetected { path: reported, found_type }) => {
            assert_eq!(reported, path);
            assert_eq!(found_type, "core");
        }
        other => panic!("expected legacy schema error, got {:?}", other.map(|r| r.entry)),
    }
    Ok(())
}

#[test]
fn deleted_entity_is_pruned_before_lookup() -> TestResult {
    let fixture = sales_fixture()?;
    let model = fixture.open()?;
    model.validate_index(true)?;

    std::fs::remove_file(fixture.zone_dir(ZoneKind::Raw).join("Sales/Customer/Customer_DE.json"))?;
    assert!(model.is_index_stale()?);
    assert!(matches!(
        model.lookup_entity("/raw/Sales/Customer/Customer_DE"),
        Err(ModelError::LocatorNotFound(_))
    ));
    assert!(!model.is_index_stale()?);
    Ok(())
}

#[test]
fn resolver_reports_zone_of_each_entry() -> TestResult {
    let fixture = sales_fixture()?;
    let model = fixture.open()?;
    let resolver = model.resolver()?;

    let (zone, entry) = resolver.resolve_in_zone("/core/Sales/Product/Product")?;
    assert_eq!(zone, ZoneKind::Core);
    assert_eq!(entry.references, Some(Vec::new()));
    assert_eq!(resolver.index().len(), 3);
    Ok(())
}
