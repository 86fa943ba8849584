use std::path::Path;

use subject_portal::notify::{NotificationBus, ServerEvent};
use subject_portal::registry::{Category, NewSubject, Registry, RegistryError, SubjectRegistry};
use tokio::sync::broadcast::error::TryRecvError;

fn test_registry() -> (tempfile::TempDir, SubjectRegistry, NotificationBus) {
    let dir = tempfile::tempdir().unwrap();
    let bus = NotificationBus::new(16);
    let registry = SubjectRegistry::new(dir.path(), dir.path().join("subjects.json"), bus.clone());
    (dir, registry, bus)
}

fn new_subject(category: Category, title: &str) -> NewSubject {
    NewSubject {
        category,
        title: title.to_string(),
        filename: None,
        pdf: None,
    }
}

fn read_document(dir: &Path) -> Registry {
    let text = std::fs::read_to_string(dir.join("subjects.json")).unwrap();
    serde_json::from_str(&text).unwrap()
}

#[tokio::test]
async fn test_add_then_list() {
    let (dir, registry, _bus) = test_registry();

    let subject = registry
        .add(new_subject(Category::DataScience, "Machine Learning!"))
        .await
        .unwrap();
    assert_eq!(subject.filename, "machine-learning.html");
    assert_eq!(subject.title, "Machine Learning!");
    assert_eq!(subject.pdf_name(), "machine-learning.pdf");

    let listing = registry.list().await;
    assert!(listing.warning.is_none());
    assert_eq!(listing.registry.data_science, vec![subject.clone()]);
    assert_eq!(listing.registry.len(), 1);

    assert_eq!(read_document(dir.path()), listing.registry);

    let page = std::fs::read_to_string(dir.path().join("machine-learning.html")).unwrap();
    assert!(page.contains("<title>Machine Learning!</title>"));
    assert!(page.contains(r#"src="pdfs/machine-learning.pdf""#));
}

#[tokio::test]
async fn test_add_publishes_exactly_one_event() {
    let (_dir, registry, bus) = test_registry();
    let mut rx = bus.subscribe();

    registry
        .add(new_subject(Category::Cyber, "Ethics"))
        .await
        .unwrap();

    match rx.try_recv().unwrap() {
        ServerEvent::SubjectsUpdated(snapshot) => {
            assert_eq!(snapshot.cyber.len(), 1);
            assert_eq!(snapshot.cyber[0].filename, "ethics.html");
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_explicit_filename_and_pdf() {
    let (dir, registry, _bus) = test_registry();

    let subject = registry
        .add(NewSubject {
            category: Category::Main,
            title: "Operating Systems".to_string(),
            filename: Some("os.html".to_string()),
            pdf: Some("os notes.pdf".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(subject.filename, "os.html");
    assert_eq!(subject.pdf.as_deref(), Some("os_notes.pdf"));

    let page = std::fs::read_to_string(dir.path().join("os.html")).unwrap();
    assert!(page.contains(r#"src="pdfs/os_notes.pdf""#));
}

#[tokio::test]
async fn test_duplicate_in_same_category_is_rejected() {
    let (dir, registry, bus) = test_registry();
    registry
        .add(new_subject(Category::Main, "Networks"))
        .await
        .unwrap();
    let before = read_document(dir.path());

    let mut rx = bus.subscribe();
    let result = registry
        .add(NewSubject {
            category: Category::Main,
            title: "Computer Networks".to_string(),
            filename: Some("networks.html".to_string()),
            pdf: None,
        })
        .await;
    assert!(matches!(
        result,
        Err(RegistryError::DuplicateSubject { category: Category::Main, ref filename })
            if filename == "networks.html"
    ));

    assert_eq!(read_document(dir.path()), before);
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_same_filename_allowed_across_categories() {
    let (_dir, registry, _bus) = test_registry();
    registry
        .add(new_subject(Category::Main, "Statistics"))
        .await
        .unwrap();
    registry
        .add(new_subject(Category::DataScience, "Statistics"))
        .await
        .unwrap();

    let listing = registry.list().await;
    assert_eq!(listing.registry.main.len(), 1);
    assert_eq!(listing.registry.data_science.len(), 1);
}

#[tokio::test]
async fn test_add_rejects_empty_or_unusable_titles() {
    let (_dir, registry, _bus) = test_registry();

    for title in ["", "   ", "!!!"] {
        let result = registry.add(new_subject(Category::Main, title)).await;
        assert!(
            matches!(result, Err(RegistryError::Invalid(_))),
            "title {title:?}"
        );
    }

    let result = registry
        .add(NewSubject {
            category: Category::Main,
            title: "Sneaky".to_string(),
            filename: Some("../outside.html".to_string()),
            pdf: None,
        })
        .await;
    assert!(matches!(result, Err(RegistryError::Invalid(_))));
}

#[tokio::test]
async fn test_remove_deletes_record_and_page_but_not_pdf() {
    let (dir, registry, bus) = test_registry();
    registry
        .add(new_subject(Category::Cyber, "Ethics"))
        .await
        .unwrap();
    let pdf_dir = dir.path().join("pdfs");
    std::fs::create_dir_all(&pdf_dir).unwrap();
    std::fs::write(pdf_dir.join("ethics.pdf"), "%PDF").unwrap();

    let mut rx = bus.subscribe();
    registry.remove(Category::Cyber, "ethics.html").await.unwrap();

    assert!(registry.list().await.registry.is_empty());
    assert!(!dir.path().join("ethics.html").exists());
    assert!(pdf_dir.join("ethics.pdf").exists());

    assert_eq!(rx.try_recv().unwrap().event_type(), "subjects-updated");
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_remove_survives_missing_page() {
    let (dir, registry, _bus) = test_registry();
    registry
        .add(new_subject(Category::Main, "Algebra"))
        .await
        .unwrap();
    std::fs::remove_file(dir.path().join("algebra.html")).unwrap();

    registry.remove(Category::Main, "algebra.html").await.unwrap();
    assert!(registry.list().await.registry.main.is_empty());
}

#[tokio::test]
async fn test_remove_unknown_subject_changes_nothing() {
    let (dir, registry, bus) = test_registry();
    registry
        .add(new_subject(Category::Main, "Algebra"))
        .await
        .unwrap();
    let before = read_document(dir.path());

    let mut rx = bus.subscribe();
    // Right filename, wrong category.
    let result = registry.remove(Category::Cyber, "algebra.html").await;
    assert!(matches!(result, Err(RegistryError::NotFound { .. })));

    assert_eq!(read_document(dir.path()), before);
    assert!(dir.path().join("algebra.html").exists());
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_bootstrap_from_listing_pages() {
    let (dir, registry, _bus) = test_registry();
    std::fs::write(
        dir.path().join("index.html"),
        r#"<ul id="main-subjects-list"><li><a href="networks.html">Networks</a></li></ul>"#,
    )
    .unwrap();
    std::fs::write(
        dir.path().join("cybersecurity.html"),
        r#"<ul id="cyber-subjects">
             <li><a href="ethics.html">Ethics</a></li>
             <li><a href="crypto.html">Cryptography</a></li>
           </ul>"#,
    )
    .unwrap();

    assert!(registry.ensure_initialized().await.unwrap());
    assert!(!registry.ensure_initialized().await.unwrap());

    let listing = registry.list().await;
    assert_eq!(listing.registry.main.len(), 1);
    assert_eq!(listing.registry.cyber.len(), 2);
    assert!(listing.registry.data_science.is_empty());
    assert_eq!(listing.registry.cyber[1].title, "Cryptography");
    assert_eq!(listing.registry.cyber[1].pdf_name(), "crypto.pdf");

    assert!(dir.path().join("subjects.json").exists());
}

#[tokio::test]
async fn test_list_bootstraps_lazily() {
    let (dir, registry, _bus) = test_registry();
    assert!(!dir.path().join("subjects.json").exists());

    let listing = registry.list().await;
    assert!(listing.registry.is_empty());
    assert!(listing.warning.is_none());
    assert!(dir.path().join("subjects.json").exists());
}

#[tokio::test]
async fn test_corrupt_document_degrades_on_read_and_blocks_writes() {
    let (dir, registry, bus) = test_registry();
    std::fs::write(dir.path().join("subjects.json"), "[1, 2").unwrap();

    let listing = registry.list().await;
    assert_eq!(listing.registry, Registry::default());
    assert!(listing.warning.is_some());

    let mut rx = bus.subscribe();
    let result = registry.add(new_subject(Category::Main, "Algebra")).await;
    assert!(matches!(result, Err(RegistryError::Corrupt(_))));
    assert!(!dir.path().join("algebra.html").exists());
    assert_eq!(
        std::fs::read_to_string(dir.path().join("subjects.json")).unwrap(),
        "[1, 2"
    );
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_legacy_document_without_pdf_field() {
    let (dir, registry, _bus) = test_registry();
    std::fs::write(
        dir.path().join("subjects.json"),
        r#"{"main":[{"title":"Networks","filename":"networks.html"}],"data-science":[],"cyber":[]}"#,
    )
    .unwrap();

    let listing = registry.list().await;
    let subject = &listing.registry.main[0];
    assert_eq!(subject.pdf, None);
    assert_eq!(subject.pdf_name(), "networks.pdf");
}

#[tokio::test]
async fn test_unknown_categories_survive_mutations() {
    let (dir, registry, _bus) = test_registry();
    std::fs::write(
        dir.path().join("subjects.json"),
        r#"{"main":[],"data-science":[],"cyber":[],"physics":[{"title":"Optics","filename":"optics.html"}]}"#,
    )
    .unwrap();

    registry
        .add(new_subject(Category::Main, "Ethics"))
        .await
        .unwrap();
    registry.remove(Category::Main, "ethics.html").await.unwrap();

    let text = std::fs::read_to_string(dir.path().join("subjects.json")).unwrap();
    let document: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(document["physics"][0]["title"], "Optics");
    assert_eq!(document["physics"][0]["filename"], "optics.html");
}

#[tokio::test]
async fn test_add_refuses_reserved_page_names() {
    let (dir, registry, bus) = test_registry();
    std::fs::write(dir.path().join("index.html"), "HOME").unwrap();
    std::fs::write(dir.path().join("add-pdf.js"), "SCRIPT").unwrap();
    let mut rx = bus.subscribe();

    // Derived from the title.
    let result = registry.add(new_subject(Category::Cyber, "Index")).await;
    assert!(matches!(result, Err(RegistryError::Invalid(_))));

    for filename in [
        "cybersecurity.html",
        "Data-Science.html",
        "404.html",
        "add-pdf.js",
        "subjects.json",
        "notes.txt",
        ".html",
    ] {
        let result = registry
            .add(NewSubject {
                category: Category::Main,
                title: "Clobber".to_string(),
                filename: Some(filename.to_string()),
                pdf: None,
            })
            .await;
        assert!(
            matches!(result, Err(RegistryError::Invalid(_))),
            "filename {filename:?}"
        );
    }

    assert_eq!(
        std::fs::read_to_string(dir.path().join("index.html")).unwrap(),
        "HOME"
    );
    assert_eq!(
        std::fs::read_to_string(dir.path().join("add-pdf.js")).unwrap(),
        "SCRIPT"
    );
    assert!(registry.list().await.registry.is_empty());
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
}
