mod common;

use common::workspace;
use marksapp::error::MarksError;
use marksapp::model::Bookmark;
use marksapp::store::json::JsonStore;
use marksapp::store::memory::InMemoryStore;
use marksapp::store::BookmarkStore;
use marksapp::sync::codec::RecordCodec;
use marksapp::sync::conflict::{ConflictResolver, WriteDecision};
use marksapp::sync::dedup;
use marksapp::sync::manifest::{ClientInfo, RepoStats, SyncManifest, MANIFEST_FILE};
use marksapp::sync::paths::PathResolver;
use marksapp::sync::tracker::RepositoryTracker;
use marksapp::sync::walker::BulkWalker;
use std::fs;
use std::path::Path;

fn bm(url: &str, title: &str) -> Bookmark {
    Bookmark::new(url, title, "", ["test"])
}

fn record_files(root: &Path) -> Vec<std::path::PathBuf> {
    let mut files: Vec<_> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && e.file_name() != MANIFEST_FILE)
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

#[test]
fn paths_are_deterministic_across_resolvers() {
    let a = PathResolver::new(Path::new("/r"), ".json");
    let b = PathResolver::new(Path::new("/r"), "json");
    for url in ["https://a.com/1", "http://B.com:8080/x?y=z", "example.org/path"] {
        assert_eq!(a.resolve_url(url).unwrap(), b.resolve_url(url).unwrap());
    }
}

#[test]
fn decode_of_encode_preserves_every_field() {
    let mut records = vec![
        bm("https://a.com", "A"),
        Bookmark::new("https://b.com", "Ünïcode title", "multi\nline", ["x", "y", "z"]).with_favorite(true),
        Bookmark::new("https://c.com", "", "", Vec::<String>::new()),
    ];
    records[0].id = 99;
    records[0].seal();

    for record in records {
        let decoded = RecordCodec::decode(&RecordCodec::encode(&record).unwrap()).unwrap();
        assert_eq!(decoded, record);
        assert!(decoded.verify());
    }
}

#[test]
fn corrupted_file_fails_the_whole_load() {
    let ws = workspace();
    let repo = ws.repo("bookmarks");
    let records: Vec<_> = (0..20).map(|i| bm(&format!("https://s{}.com/{}", i % 4, i), "t")).collect();
    repo.export(&records, false).unwrap();

    let files = record_files(&repo.loc());
    assert_eq!(files.len(), 20);
    let victim = &files[7];
    let text = fs::read_to_string(victim).unwrap().replace("\"t\"", "\"x\"");
    fs::write(victim, text).unwrap();

    match repo.load() {
        Err(MarksError::ChecksumMismatch { .. }) => {}
        other => panic!("expected checksum mismatch, got {:?}", other.map(|r| r.len())),
    }
}

#[test]
fn exporting_unchanged_records_writes_nothing() {
    let ws = workspace();
    let repo = ws.repo("bookmarks");
    let records = vec![bm("https://a.com/1", "one"), bm("https://b.com/2", "two")];
    repo.export(&records, false).unwrap();

    let before: Vec<_> = record_files(&repo.loc())
        .iter()
        .map(|p| fs::metadata(p).unwrap().modified().unwrap())
        .collect();
    let report = repo.export(&records, false).unwrap();
    let after: Vec<_> = record_files(&repo.loc())
        .iter()
        .map(|p| fs::metadata(p).unwrap().modified().unwrap())
        .collect();

    assert_eq!(report.written, 0);
    assert_eq!(report.skipped, 2);
    assert_eq!(before, after);
}

#[test]
fn changed_content_overwrites_with_or_without_force() {
    let dir = tempfile::tempdir().unwrap();
    let resolver = PathResolver::new(dir.path(), ".json");
    let conflicts = ConflictResolver::new(RecordCodec::plain());
    let original = bm("https://a.com/1", "old");
    let path = resolver.resolve(&original).unwrap();
    conflicts.apply(&path, &original, false).unwrap();

    for force in [false, true] {
        let mut changed = original.clone();
        changed.title = format!("new {}", force);
        changed.touch();
        assert_eq!(conflicts.apply(&path, &changed, force).unwrap(), WriteDecision::Write);
        assert_eq!(RecordCodec::plain().read(&path).unwrap().title, changed.title);
    }
}

#[test]
fn dedup_returns_exactly_the_absent_urls_in_order() {
    let mut store = InMemoryStore::new("bookmarks");
    store
        .insert_many(vec![bm("https://2.com", ""), bm("https://4.com", "")])
        .unwrap();
    let batch: Vec<_> = (1..=6).map(|i| bm(&format!("https://{}.com", i), "")).collect();

    let kept: Vec<_> = dedup::filter(&store, batch)
        .unwrap()
        .into_iter()
        .map(|b| b.url)
        .collect();
    assert_eq!(kept, vec!["https://1.com", "https://3.com", "https://5.com", "https://6.com"]);
}

#[test]
fn tracker_rejects_use_before_load() {
    let dir = tempfile::tempdir().unwrap();
    let tracker = RepositoryTracker::new(dir.path());
    assert!(matches!(tracker.contains("id"), Err(MarksError::TrackerNotLoaded)));
    assert!(matches!(tracker.save(), Err(MarksError::TrackerNotLoaded)));

    let mut tracker = RepositoryTracker::new(dir.path());
    tracker.load().unwrap();
    tracker.track("id").unwrap();
    tracker.untrack("id").unwrap();
    tracker.save().unwrap();
    let mut reloaded = RepositoryTracker::new(dir.path());
    reloaded.load().unwrap();
    assert!(reloaded.ids().unwrap().is_empty());
}

#[test]
fn duplicate_url_export_scenario() {
    let ws = workspace();
    let repo = ws.repo("bookmarks");
    let first = bm("https://a.com/1", "a");
    let records = vec![first.clone(), bm("https://b.com/2", "b"), first];

    let report = repo.export(&records, false).unwrap();
    assert_eq!((report.written, report.skipped), (2, 1));

    let mut domains: Vec<_> = fs::read_dir(repo.loc())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    domains.sort();
    assert_eq!(domains, vec!["a.com", "b.com"]);
    assert_eq!(record_files(&repo.loc()).len(), 2);
}

#[test]
fn manifest_checksum_tracks_stats_only() {
    let client = ClientInfo::current();
    let stats = RepoStats {
        name: "bookmarks".to_string(),
        bookmarks: 5,
        tags: 2,
        favorites: 1,
    };
    let a = SyncManifest::new(stats.clone(), "main", "", client.clone());
    let b = SyncManifest::new(stats.clone(), "main", "", client.clone());
    assert_eq!(a.checksum, b.checksum);

    let bumped = RepoStats { bookmarks: 6, ..stats };
    let c = SyncManifest::new(bumped, "main", "", client);
    assert_ne!(a.checksum, c.checksum);
}

#[test]
fn export_then_import_moves_bookmarks_between_databases() {
    let ws = workspace();
    let mut source = JsonStore::open(&ws.data_dir, "bookmarks").unwrap();
    source
        .insert_many(vec![
            bm("https://a.com/1", "one"),
            bm("https://b.com/2", "two").with_favorite(true),
            bm("https://c.com/3", "three"),
        ])
        .unwrap();

    let repo = ws.repo("bookmarks");
    repo.export(&source.all().unwrap(), false).unwrap();
    repo.commit(&source, "initial").unwrap();

    let mut target = JsonStore::open(&ws.data_dir, "restored").unwrap();
    let report = repo.import_into(&mut target).unwrap();
    assert_eq!((report.found, report.imported, report.duplicates), (3, 3, 0));

    let reopened = JsonStore::open(&ws.data_dir, "restored").unwrap();
    let mut urls: Vec<_> = reopened.all().unwrap().into_iter().map(|b| b.url).collect();
    urls.sort();
    assert_eq!(urls, vec!["https://a.com/1", "https://b.com/2", "https://c.com/3"]);
    assert_eq!(reopened.count(marksapp::store::Table::Favorites).unwrap(), 1);
}

#[test]
fn walker_ignores_manifest_and_tracker_files() {
    let ws = workspace();
    let repo = ws.repo("bookmarks");
    let store = InMemoryStore::new("bookmarks");
    repo.export(&[bm("https://a.com", "a")], false).unwrap();
    repo.write_stats(&store).unwrap();

    let walker = BulkWalker::new(RecordCodec::plain());
    assert_eq!(walker.candidates(&repo.loc()).count(), 1);
    assert_eq!(walker.load_all(&repo.loc()).unwrap().len(), 1);
}
