// tests/conversion.rs
//! End-to-end conversion of fixture objects through a `RepositoryClient`.

use chrono::{DateTime, TimeZone, Utc};
use cmis_objects::{
    ClientConfig, DomainObject, FixtureRepository, PropertyValue, RawValue, RepositoryClient,
    TypedValue,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

const SITE: &str = include_str!("fixtures/engineering_site.json");

fn client() -> (RepositoryClient, Arc<FixtureRepository>) {
    let repository = Arc::new(FixtureRepository::parse(SITE, "engineering_site.json").unwrap());
    let client = RepositoryClient::new(
        repository.clone(),
        repository.clone(),
        ClientConfig::default(),
    );
    (client, repository)
}

async fn object(client: &RepositoryClient, path: &str) -> DomainObject {
    let (_, completion) = client.object(path);
    completion.await.expect("not cancelled").expect("converted")
}

#[tokio::test]
async fn invoice_properties_are_typed() {
    let (client, _) = client();
    let invoice = object(
        &client,
        "/Sites/engineering/documentLibrary/invoice-2023-001.pdf",
    )
    .await;

    let document = invoice.as_document().expect("custom type with document base");
    assert_eq!(invoice.object_type_id().as_str(), "D:inv:invoice");
    assert_eq!(document.content_stream_length, Some(48213));
    assert_eq!(document.version_label.as_deref(), Some("1.2"));
    assert_eq!(document.is_latest_version, Some(true));

    let props = invoice.properties();
    assert_eq!(props.value("inv:amount"), Some(&TypedValue::Decimal(1249.5)));
    assert_eq!(props.boolean("inv:paid"), Some(false));
    assert_eq!(props.strings("inv:tags"), vec!["q1", "hardware"]);
    assert_eq!(
        props.string("inv:portal"),
        Some("https://billing.example.com/invoices/2023-001")
    );
    assert_eq!(
        invoice.common().creation_date(),
        Some(&Utc.with_ymd_and_hms(2023, 1, 1, 11, 0, 0).unwrap())
    );
    assert!(invoice.can("canGetContentStream"));
}

#[tokio::test]
async fn undefined_properties_join_the_extension_bag() {
    let (client, _) = client();
    let invoice = object(
        &client,
        "/Sites/engineering/documentLibrary/invoice-2023-001.pdf",
    )
    .await;

    let extensions = invoice.properties().extensions();
    let keys: Vec<&str> = extensions.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["alf:aspects", "alf:workflowState"]);
    assert_eq!(
        extensions.get("alf:workflowState"),
        Some(&RawValue::scalar("pending-approval"))
    );
    assert!(!invoice.properties().contains("alf:workflowState"));
}

#[tokio::test]
async fn converted_values_reserialize_canonically() {
    let (client, _) = client();
    let invoice = object(
        &client,
        "/Sites/engineering/documentLibrary/invoice-2023-001.pdf",
    )
    .await;
    let props = invoice.properties();

    let raw = |id: &str| props.get(id).map(|data| data.value.to_raw());
    assert_eq!(raw("inv:amount"), Some(RawValue::scalar("1249.5")));
    assert_eq!(raw("inv:paid"), Some(RawValue::scalar("false")));
    assert_eq!(raw("inv:tags"), Some(RawValue::multi(["q1", "hardware"])));
    assert_eq!(
        raw("cmis:creationDate"),
        Some(RawValue::scalar("2023-01-01T11:00:00.000Z"))
    );
    assert_eq!(raw("cmis:contentStreamLength"), Some(RawValue::scalar("48213")));
}

#[tokio::test]
async fn folder_and_relationship_variants() {
    let (client, _) = client();

    let site = object(&client, "/Sites/engineering").await;
    let folder = site.as_folder().expect("folder");
    assert_eq!(folder.path.as_deref(), Some("/Sites/engineering"));
    assert_eq!(folder.parent_id.as_deref(), Some("f-sites"));
    assert_eq!(site.common().created_by(), Some("admin"));
    assert!(site.can("canCreateFolder"));

    let link = object(&client, "/relationships/r-1").await;
    let relationship = link.as_relationship().expect("relationship");
    assert_eq!(link.name(), "r-1");
    assert_eq!(relationship.source_id.as_deref(), Some("d-invoice"));
    assert_eq!(relationship.target_id.as_deref(), Some("d-budget"));

    let json = serde_json::to_value(&link).unwrap();
    assert_eq!(json["kind"], "relationship");
    assert_eq!(json["target_id"], "d-budget");
}

#[tokio::test]
async fn listing_selects_variants_per_type() {
    let (client, repository) = client();
    let (_, completion) = client.all_children("/Sites/engineering/documentLibrary");
    let objects = completion.await.unwrap().unwrap();

    let kinds: Vec<(&str, &str)> = objects
        .iter()
        .map(|o| (o.id().as_str(), o.kind_name()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("f-drafts", "folder"),
            ("d-budget", "document"),
            ("d-invoice", "document"),
            ("d-readme", "document"),
            ("p-retention", "generic"),
        ]
    );

    let readme = &objects[3];
    assert_eq!(readme.properties().string("cm:title"), Some("Start here"));
    assert_eq!(
        readme.properties().value("cm:description"),
        Some(&TypedValue::Html("<p>How this library is organised</p>".into()))
    );

    let budget = objects[1].as_document().unwrap();
    assert_eq!(budget.is_latest_version, Some(true));
    assert_eq!(
        budget.common.last_modification_date(),
        Some(
            &DateTime::parse_from_rfc3339("2023-02-10T15:45:30.250Z")
                .unwrap()
                .with_timezone(&Utc)
        )
    );

    let invoice_tags = objects[2].properties().get("inv:tags").map(|d| &d.value);
    assert_eq!(invoice_tags, Some(&PropertyValue::Multi(vec![])));

    assert_eq!(objects[4].properties().integer("acme:retainYears"), Some(7));

    // folder, document, invoice, titled aspect, retention policy
    assert_eq!(repository.type_fetch_count(), 5);
}
