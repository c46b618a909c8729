//! In-memory fake engine for the serialization tests.
//!
//! `TestDb` counts engine round-trips so tests can assert query budgets:
//! the base fetch is one, a batched prefetch is one more for the whole
//! batch, and lazy relation access on a row that was never loaded costs one
//! per call.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use qserializer::{Query, Relations, Result};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Company {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Bus {
    pub id: u32,
    pub plate: String,
    pub company_id: u32,
    /// Populated by an eager join or a batched prefetch of `"company"`.
    pub company: Option<Company>,
    /// Auxiliary data a bulk preparation hook may attach.
    pub occupancy: Option<u32>,
}

impl Bus {
    /// Relation access the way an ORM row would do it: free when the
    /// relation was loaded with the query, one lazy round-trip otherwise.
    pub fn company(&self, db: &TestDb) -> Company {
        match &self.company {
            Some(company) => company.clone(),
            None => db.company_by_id(self.company_id),
        }
    }
}

#[derive(Debug, Clone)]
struct BusRecord {
    id: u32,
    plate: String,
    company_id: u32,
}

pub struct TestDb {
    companies: Vec<Company>,
    buses: Vec<BusRecord>,
    round_trips: AtomicUsize,
}

impl TestDb {
    /// One company with two buses, the standard fixture.
    pub fn fixture() -> Arc<Self> {
        Arc::new(Self {
            companies: vec![Company {
                id: 1,
                name: "Hurricane Cart".into(),
            }],
            buses: vec![
                BusRecord {
                    id: 1,
                    plate: "ABC-1234".into(),
                    company_id: 1,
                },
                BusRecord {
                    id: 2,
                    plate: "XYZ-9876".into(),
                    company_id: 1,
                },
            ],
            round_trips: AtomicUsize::new(0),
        })
    }

    pub fn round_trips(&self) -> usize {
        self.round_trips.load(Ordering::SeqCst)
    }

    fn count_round_trip(&self) {
        self.round_trips.fetch_add(1, Ordering::SeqCst);
    }

    /// Lazy single-company lookup, counted as one round-trip.
    pub fn company_by_id(&self, id: u32) -> Company {
        self.count_round_trip();
        self.companies
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .expect("unknown company id")
    }
}

/// Runs `f` and asserts how many engine round-trips it performed.
pub fn assert_round_trips<T>(db: &TestDb, expected: usize, f: impl FnOnce() -> T) -> T {
    let before = db.round_trips();
    let out = f();
    assert_eq!(
        db.round_trips() - before,
        expected,
        "unexpected round-trip count"
    );
    out
}

/// A bus query against [`TestDb`], with value-type derivations.
#[derive(Clone)]
pub struct BusQuery {
    db: Arc<TestDb>,
    eager: Relations,
    prefetch: Relations,
    plate: Option<String>,
    limit: Option<usize>,
}

impl BusQuery {
    pub fn new(db: &Arc<TestDb>) -> Self {
        Self {
            db: Arc::clone(db),
            eager: Relations::new(),
            prefetch: Relations::new(),
            plate: None,
            limit: None,
        }
    }

    pub fn filter_plate(mut self, plate: &str) -> Self {
        self.plate = Some(plate.to_string());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn eager(&self) -> &Relations {
        &self.eager
    }

    pub fn prefetch(&self) -> &Relations {
        &self.prefetch
    }
}

impl Query for BusQuery {
    type Row = Bus;

    fn with_eager_join(mut self, relations: &Relations) -> Self {
        self.eager.extend(relations.iter().cloned());
        self
    }

    fn with_batched_prefetch(mut self, relations: &Relations) -> Self {
        self.prefetch.extend(relations.iter().cloned());
        self
    }

    fn fetch(&self) -> Result<Vec<Bus>> {
        let db = &self.db;
        db.count_round_trip(); // base query

        let mut rows: Vec<Bus> = db
            .buses
            .iter()
            .filter(|b| self.plate.as_deref().map_or(true, |p| b.plate == p))
            .take(self.limit.unwrap_or(usize::MAX))
            .map(|b| Bus {
                id: b.id,
                plate: b.plate.clone(),
                company_id: b.company_id,
                company: None,
                occupancy: None,
            })
            .collect();

        if self.eager.iter().any(|r| r == "company") {
            // joined columns land in the same round-trip
            for bus in &mut rows {
                bus.company = db.companies.iter().find(|c| c.id == bus.company_id).cloned();
            }
        }

        if self.prefetch.iter().any(|r| r == "company") && rows.iter().any(|b| b.company.is_none())
        {
            db.count_round_trip(); // one batch query covering every row
            for bus in &mut rows {
                if bus.company.is_none() {
                    bus.company = db.companies.iter().find(|c| c.id == bus.company_id).cloned();
                }
            }
        }

        Ok(rows)
    }
}
