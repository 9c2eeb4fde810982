use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use datefacts::{
    history::{Clock, FileStore, KeyValueStore, MemoryStore},
    Config, DataService, Error, FetchError, Field, NOT_FOUND_MESSAGE,
};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

const SNAPSHOT_URL: &str = "https://sheets.example.com/snapshot?output=csv";
const DATED_URL: &str = "https://sheets.example.com/dated?output=csv";
const CURRENT_URL: &str = "https://sheets.example.com/current?output=csv";
const HISTORICAL_URL: &str = "https://sheets.example.com/historical?output=csv";

const SNAPSHOT_CSV: &str = "GAS (GALLON),TROY OUNCE OF GOLD,Silver Oz,Dow\n\
    $3.10,$2000.00,$24.00,\"43,100\"\n";
const DATED_CSV: &str = "Year,Gas,Dow,President\n\
    1969,$0.35,800,Richard Nixon\n\
    1988,$0.91,\"2,168\",Ronald Reagan\n";
const CURRENT_CSV: &str = "Geographic Area,April 1 Population Base,Population Estimate 2023\n\
    \".Kansas City city, Missouri\",\"508,090\",\"510,704\"\n\
    \".St. Louis city, Missouri\",\"301,578\",\"281,754\"\n";
const HISTORICAL_CSV: &str = "City,State,1970,1980,1990\n\
    Kansas City city,Missouri,\"507,087\",\"448,159\",\"435,146\"\n\
    St. Louis city,Missouri,\"622,236\",\"452,801\",\"396,685\"\n";

/// Canned sheets keyed by URL; unknown URLs answer 503.
#[derive(Default)]
struct Sheets {
    bodies: Mutex<HashMap<String, String>>,
    calls: AtomicUsize,
}

impl Sheets {
    fn standard() -> Arc<Self> {
        let sheets = Arc::new(Self::default());
        sheets.put(SNAPSHOT_URL, SNAPSHOT_CSV);
        sheets.put(DATED_URL, DATED_CSV);
        sheets.put(CURRENT_URL, CURRENT_CSV);
        sheets.put(HISTORICAL_URL, HISTORICAL_CSV);
        sheets
    }

    fn put(&self, url: &str, body: &str) {
        self.bodies
            .lock()
            .unwrap()
            .insert(url.to_string(), body.to_string());
    }

    fn take_down(&self, url: &str) {
        self.bodies.lock().unwrap().remove(url);
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl datefacts::fetch::TextFetcher for Sheets {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.bodies
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 503,
                snippet: "Service Unavailable".to_string(),
            })
    }
}

struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

fn config() -> Config {
    Config {
        snapshot_url: SNAPSHOT_URL.to_string(),
        historical_snapshot_url: Some(DATED_URL.to_string()),
        current_population_url: CURRENT_URL.to_string(),
        historical_population_url: HISTORICAL_URL.to_string(),
        ..Config::default()
    }
}

fn service(sheets: Arc<Sheets>, store: Arc<dyn KeyValueStore>) -> DataService {
    let clock = Arc::new(FixedClock(
        Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap(),
    ));
    DataService::with_parts(&config(), sheets, store, clock)
}

#[tokio::test]
async fn snapshot_is_aliased_cached_and_cleared() {
    let sheets = Sheets::standard();
    let svc = service(sheets.clone(), Arc::new(MemoryStore::new()));

    let rec = svc.all_snapshot_values().await;
    assert_eq!(rec.get(Field::GallonOfGasoline), Some("$3.10"));
    assert_eq!(rec.get(Field::GoldOz), Some("$2000.00"));
    assert_eq!(rec.get(Field::SilverOz), Some("$24.00"));
    assert_eq!(rec.get(Field::DowJonesClose), Some("43,100"));
    assert_eq!(rec.get_raw("GAS (GALLON)"), Some("$3.10"));
    assert_eq!(rec.get(Field::President), Some("Donald J. Trump"));

    svc.all_snapshot_values().await;
    assert_eq!(sheets.calls(), 1);

    svc.clear_cache().unwrap();
    svc.all_snapshot_values().await;
    assert_eq!(sheets.calls(), 2);
}

#[tokio::test]
async fn durable_cache_outlives_the_service() {
    let dir = tempfile::tempdir().unwrap();
    let sheets = Sheets::standard();
    let first = service(sheets.clone(), Arc::new(FileStore::new(dir.path()).unwrap()));
    first.all_snapshot_values().await;
    drop(first);

    sheets.take_down(SNAPSHOT_URL);
    let second = service(sheets.clone(), Arc::new(FileStore::new(dir.path()).unwrap()));
    let rec = second.all_snapshot_values().await;
    assert_eq!(rec.get(Field::GoldOz), Some("$2000.00"));
    assert_eq!(sheets.calls(), 1);

    // cache gone, sheet down: metals come from the permanent backup
    second.clear_cache().unwrap();
    let rec = second.all_snapshot_values().await;
    assert_eq!(rec.get(Field::GoldOz), Some("$2000.00"));
    assert_eq!(rec.get(Field::GallonOfGasoline), Some("$3.15"));
}

#[tokio::test]
async fn past_dates_use_the_dated_sheet() {
    let svc = service(Sheets::standard(), Arc::new(MemoryStore::new()));

    let rec = svc.snapshot_for_date("1975-07-04").await.unwrap();
    assert_eq!(rec.get(Field::GallonOfGasoline), Some("$0.35"));
    assert_eq!(rec.get(Field::President), Some("Richard Nixon"));

    let rec = svc.snapshot_for_date("2025-01-20").await.unwrap();
    assert_eq!(rec.get(Field::GoldOz), Some("$2000.00"));

    assert!(matches!(
        svc.snapshot_for_date("yesterday").await,
        Err(Error::Parse { .. })
    ));
}

#[tokio::test]
async fn population_routes_on_birth_date() {
    let svc = service(Sheets::standard(), Arc::new(MemoryStore::new()));

    // 1975 sits halfway between 1970 and 1980
    let p = svc
        .population_for_city("Kansas City, MO", Some("1975-05-05"))
        .await
        .unwrap();
    assert_eq!(p, Some(477_623));

    let p = svc
        .population_for_city("St. Louis, Missouri", Some("2019-12-31"))
        .await
        .unwrap();
    assert_eq!(p, Some(396_685));

    let p = svc
        .population_for_city("St. Louis, Missouri", Some("2020-01-01"))
        .await
        .unwrap();
    assert_eq!(p, Some(281_754));

    let p = svc
        .current_population_for_city("Kansas City, MO")
        .await
        .unwrap();
    assert_eq!(p, Some(510_704));
}

#[tokio::test]
async fn unknown_places_are_not_found_not_errors() {
    let svc = service(Sheets::standard(), Arc::new(MemoryStore::new()));
    assert_eq!(
        svc.population_for_city("Nowhereville, ZZ", None).await.unwrap(),
        None
    );
    assert_eq!(
        svc.population_for_city("Nowhereville, ZZ", Some("1980-01-01"))
            .await
            .unwrap(),
        None
    );
    assert_eq!(svc.not_found_message(), NOT_FOUND_MESSAGE);
}

#[tokio::test]
async fn unreachable_current_table_is_an_error() {
    let sheets = Sheets::standard();
    sheets.take_down(CURRENT_URL);
    let svc = service(sheets, Arc::new(MemoryStore::new()));

    let err = svc
        .current_population_for_city("Kansas City, MO")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Fetch(FetchError::Status { status: 503, .. })));
}
