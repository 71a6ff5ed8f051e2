#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, params};
use tempfile::{TempDir, tempdir};

pub const YELLOW_HEADER: &str = "VendorID,tpep_pickup_datetime,tpep_dropoff_datetime,passenger_count,trip_distance,RatecodeID,store_and_fwd_flag,PULocationID,DOLocationID,payment_type,fare_amount,extra,mta_tax,tip_amount,tolls_amount,improvement_surcharge,total_amount,congestion_surcharge,Airport_fee";

pub const GREEN_HEADER: &str = "VendorID,lpep_pickup_datetime,lpep_dropoff_datetime,store_and_fwd_flag,RatecodeID,PULocationID,DOLocationID,passenger_count,trip_distance,fare_amount,extra,mta_tax,tip_amount,tolls_amount,ehail_fee,improvement_surcharge,total_amount,payment_type,trip_type,congestion_surcharge";

#[derive(Debug, Clone, Copy)]
pub struct Trip {
    pub vendor: i64,
    pub pickup: &'static str,
    pub dropoff: &'static str,
    pub pu_location: i64,
    pub do_location: i64,
    pub payment: i64,
    pub fare: f64,
    pub tolls: f64,
}

/// Fares 10, 20, 30; tolls 1, 0, 2; payments 1, 1, 2; vendors 1, 2, 2.
pub const YELLOW_TRIPS: [Trip; 3] = [
    Trip {
        vendor: 1,
        pickup: "2025-05-01 08:00:00",
        dropoff: "2025-05-01 08:20:00",
        pu_location: 100,
        do_location: 230,
        payment: 1,
        fare: 10.0,
        tolls: 1.0,
    },
    Trip {
        vendor: 2,
        pickup: "2025-05-02 09:00:00",
        dropoff: "2025-05-02 09:20:00",
        pu_location: 100,
        do_location: 48,
        payment: 1,
        fare: 20.0,
        tolls: 0.0,
    },
    Trip {
        vendor: 2,
        pickup: "2025-06-01 10:00:00",
        dropoff: "2025-06-01 10:20:00",
        pu_location: 161,
        do_location: 230,
        payment: 2,
        fare: 30.0,
        tolls: 2.0,
    },
];

/// Fares 5, 15; tolls 0, 0.5; payments 2, 3; vendors 2, 6. The first
/// pickup uses the `T` separator.
pub const GREEN_TRIPS: [Trip; 2] = [
    Trip {
        vendor: 2,
        pickup: "2025-05-01T07:30:00",
        dropoff: "2025-05-01T07:50:00",
        pu_location: 74,
        do_location: 41,
        payment: 2,
        fare: 5.0,
        tolls: 0.0,
    },
    Trip {
        vendor: 6,
        pickup: "2025-06-03 12:00:00",
        dropoff: "2025-06-03 12:20:00",
        pu_location: 100,
        do_location: 41,
        payment: 3,
        fare: 15.0,
        tolls: 0.5,
    },
];

pub fn yellow_csv(trips: &[Trip]) -> String {
    let mut out = format!("{YELLOW_HEADER}\n");
    for t in trips {
        out.push_str(&format!(
            "{},{},{},1,2.5,1,N,{},{},{},{},0.5,0.5,0,{},1,{},2.5,0\n",
            t.vendor,
            t.pickup,
            t.dropoff,
            t.pu_location,
            t.do_location,
            t.payment,
            t.fare,
            t.tolls,
            t.fare + t.tolls + 2.0
        ));
    }
    out
}

pub fn green_csv(trips: &[Trip]) -> String {
    let mut out = format!("{GREEN_HEADER}\n");
    for t in trips {
        out.push_str(&format!(
            "{},{},{},N,1,{},{},1,1.2,{},0,0.5,0,{},,1,{},{},1,0\n",
            t.vendor,
            t.pickup,
            t.dropoff,
            t.pu_location,
            t.do_location,
            t.fare,
            t.tolls,
            t.fare + t.tolls + 1.5,
            t.payment
        ));
    }
    out
}

/// Writes a per-source store whose raw `trips` table declares both
/// dialects' timestamp columns.
pub fn write_source_store(path: &Path, yellow: &[Trip], green: &[Trip]) {
    let conn = Connection::open(path).expect("open source store");
    conn.execute_batch(
        "CREATE TABLE trips (
            VendorID INTEGER,
            tpep_pickup_datetime TIMESTAMP,
            tpep_dropoff_datetime TIMESTAMP,
            lpep_pickup_datetime TIMESTAMP,
            lpep_dropoff_datetime TIMESTAMP,
            PULocationID INTEGER,
            DOLocationID INTEGER,
            payment_type INTEGER,
            fare_amount DOUBLE,
            tolls_amount DOUBLE
        )",
    )
    .expect("create source trips");
    let mut insert = conn
        .prepare("INSERT INTO trips VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)")
        .expect("prepare insert");
    for t in yellow {
        insert
            .execute(params![
                t.vendor,
                t.pickup,
                t.dropoff,
                None::<String>,
                None::<String>,
                t.pu_location,
                t.do_location,
                t.payment,
                t.fare,
                t.tolls
            ])
            .expect("insert yellow");
    }
    for t in green {
        insert
            .execute(params![
                t.vendor,
                None::<String>,
                None::<String>,
                t.pickup,
                t.dropoff,
                t.pu_location,
                t.do_location,
                t.payment,
                t.fare,
                t.tolls
            ])
            .expect("insert green");
    }
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}
