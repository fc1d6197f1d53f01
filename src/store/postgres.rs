//! Diesel/Postgres backing for the `FingerprintStore` contract: a `songs`
//! table with a unique `key`, and a `fingerprints` table holding one row per
//! `(address, anchor_time_ms, song_id)` triple — a multimap keyed by
//! address, not one row per address.

use std::sync::Mutex;
use std::time::SystemTime;

use diesel::prelude::*;
use diesel::{Connection, PgConnection, RunQueryDsl};
use rustc_hash::FxHashMap;

use super::{FingerprintStore, Song, SongId};
use crate::address::Address;
use crate::error::ShazamError;
use crate::fingerprint::{Couple, Fingerprints};
use crate::schema::{fingerprints, songs};

const INSERT_BATCH_SIZE: usize = 15_000;

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = songs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
struct SongRow {
    id: i32,
    title: String,
    artist: String,
    key: String,
    created_at: Option<SystemTime>,
}

#[derive(Insertable)]
#[diesel(table_name = songs)]
struct NewSongRow<'a> {
    title: &'a str,
    artist: &'a str,
    key: &'a str,
    created_at: Option<SystemTime>,
}

#[derive(Insertable)]
#[diesel(table_name = fingerprints)]
struct NewFingerprintRow {
    address: i64,
    anchor_time_ms: i64,
    song_id: i32,
    created_at: Option<SystemTime>,
}

#[derive(Queryable, Debug)]
struct FingerprintRow {
    #[allow(dead_code)]
    id: i64,
    address: i64,
    anchor_time_ms: i64,
    song_id: i32,
    #[allow(dead_code)]
    created_at: Option<SystemTime>,
}

impl From<SongRow> for Song {
    fn from(row: SongRow) -> Self {
        Song {
            id: row.id as SongId,
            title: row.title,
            artist: row.artist,
            key: row.key,
        }
    }
}

pub struct PostgresStore {
    connector: Mutex<PgConnection>,
}

impl PostgresStore {
    pub fn connect(database_url: &str) -> Result<Self, ShazamError> {
        let conn = PgConnection::establish(database_url)
            .map_err(|e| ShazamError::StoreUnavailable(e.to_string()))?;
        Ok(Self {
            connector: Mutex::new(conn),
        })
    }
}

impl FingerprintStore for PostgresStore {
    fn register_song(&self, title: &str, artist: &str) -> Result<SongId, ShazamError> {
        let key = Song::key_for(title, artist);
        let mut conn = self.connector.lock().unwrap();

        let new_row = NewSongRow {
            title,
            artist,
            key: &key,
            created_at: Some(SystemTime::now()),
        };

        let inserted: SongRow = diesel::insert_into(songs::table)
            .values(&new_row)
            .returning(SongRow::as_returning())
            .get_result(&mut *conn)
            .map_err(|e| match e {
                diesel::result::Error::DatabaseError(
                    diesel::result::DatabaseErrorKind::UniqueViolation,
                    _,
                ) => ShazamError::DuplicateKey(key.clone()),
                other => ShazamError::StoreUnavailable(other.to_string()),
            })?;

        Ok(inserted.id as SongId)
    }

    fn get_song_by_id(&self, id: SongId) -> Result<Option<Song>, ShazamError> {
        let mut conn = self.connector.lock().unwrap();
        songs::table
            .filter(songs::id.eq(id as i32))
            .select(SongRow::as_select())
            .first(&mut *conn)
            .optional()
            .map(|row| row.map(Song::from))
            .map_err(|e| ShazamError::StoreUnavailable(e.to_string()))
    }

    fn get_song_by_key(&self, key: &str) -> Result<Option<Song>, ShazamError> {
        let mut conn = self.connector.lock().unwrap();
        songs::table
            .filter(songs::key.eq(key))
            .select(SongRow::as_select())
            .first(&mut *conn)
            .optional()
            .map(|row| row.map(Song::from))
            .map_err(|e| ShazamError::StoreUnavailable(e.to_string()))
    }

    fn delete_song_by_id(&self, id: SongId) -> Result<(), ShazamError> {
        let mut conn = self.connector.lock().unwrap();
        diesel::delete(songs::table.filter(songs::id.eq(id as i32)))
            .execute(&mut *conn)
            .map_err(|e| ShazamError::StoreUnavailable(e.to_string()))?;
        Ok(())
    }

    fn total_songs(&self) -> Result<u64, ShazamError> {
        let mut conn = self.connector.lock().unwrap();
        songs::table
            .count()
            .get_result::<i64>(&mut *conn)
            .map(|n| n as u64)
            .map_err(|e| ShazamError::StoreUnavailable(e.to_string()))
    }

    fn store_fingerprints(&self, fingerprints_map: &Fingerprints) -> Result<(), ShazamError> {
        if fingerprints_map.is_empty() {
            return Ok(());
        }

        let rows: Vec<NewFingerprintRow> = fingerprints_map
            .iter()
            .map(|(&address, couple)| NewFingerprintRow {
                address: address as i64,
                anchor_time_ms: couple.anchor_time_ms as i64,
                song_id: couple.song_id as i32,
                created_at: Some(SystemTime::now()),
            })
            .collect();

        let mut conn = self.connector.lock().unwrap();
        conn.transaction(|conn| {
            for batch in rows.chunks(INSERT_BATCH_SIZE) {
                diesel::insert_into(fingerprints::table)
                    .values(batch)
                    .execute(conn)?;
            }
            Ok::<_, diesel::result::Error>(())
        })
        .map_err(|e| ShazamError::StoreUnavailable(e.to_string()))
    }

    fn get_couples(
        &self,
        addresses: &[Address],
    ) -> Result<FxHashMap<Address, Vec<Couple>>, ShazamError> {
        if addresses.is_empty() {
            return Ok(FxHashMap::default());
        }

        let wanted: Vec<i64> = addresses.iter().map(|&a| a as i64).collect();

        let mut conn = self.connector.lock().unwrap();
        let rows: Vec<FingerprintRow> = fingerprints::table
            .filter(fingerprints::address.eq_any(&wanted))
            .select((
                fingerprints::id,
                fingerprints::address,
                fingerprints::anchor_time_ms,
                fingerprints::song_id,
                fingerprints::created_at,
            ))
            .load(&mut *conn)
            .map_err(|e| ShazamError::StoreUnavailable(e.to_string()))?;

        let mut out: FxHashMap<Address, Vec<Couple>> = FxHashMap::default();
        for row in rows {
            out.entry(row.address as Address)
                .or_default()
                .push(Couple {
                    anchor_time_ms: row.anchor_time_ms as u32,
                    song_id: row.song_id as u32,
                });
        }
        Ok(out)
    }
}
