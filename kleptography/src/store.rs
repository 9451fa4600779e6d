//! Persistence of finished runs.
//!
//! A run is stored as one versioned [`RunRecord`]. The filesystem store puts
//! each run in its own `run_<8 hex>` directory as a `bincode` file; the memory
//! store keeps records in a map and backs the tests.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use modp::GroupParameters;
use num_bigint::BigUint;
use rand::Rng;
use schnorr::{KeyPair, Transcript};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::backdoor::BackdoorKey;
use crate::config::ChannelKind;
use crate::errors::{KleptoError, StoreError};
use crate::session::{Session, SessionOutcome};

/// Schema version written by this crate.
pub const RUN_RECORD_VERSION: u32 = 1;

const RECORD_FILE: &str = "run.bin";
const MAX_ID_ATTEMPTS: usize = 16;

const RUN_ID_PREFIX: &str = "run_";
const RUN_ID_HEX_DIGITS: usize = 8;

/// Identifier of a stored run, `run_` followed by eight lowercase hex digits.
///
/// Only well-formed ids can be built, so an id is always a single plain
/// directory name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RunId(String);

impl RunId {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(format!("{RUN_ID_PREFIX}{:08x}", rng.random::<u32>()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RunId {
    type Err = StoreError;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        let well_formed = id.strip_prefix(RUN_ID_PREFIX).is_some_and(|digits| {
            digits.len() == RUN_ID_HEX_DIGITS
                && digits.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
        });
        if !well_formed {
            return Err(StoreError::InvalidRunId(id.to_owned()));
        }
        Ok(Self(id.to_owned()))
    }
}

impl TryFrom<String> for RunId {
    type Error = StoreError;

    fn try_from(id: String) -> Result<Self, Self::Error> {
        id.parse()
    }
}

impl From<RunId> for String {
    fn from(id: RunId) -> Self {
        id.0
    }
}

/// Everything needed to replay the adversary's view of a run, and to score it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    pub version: u32,
    pub channel: ChannelKind,
    pub bit_length: usize,
    pub p: BigUint,
    pub q: BigUint,
    pub g: BigUint,
    pub secret_key: BigUint,
    pub public_key: BigUint,
    /// Hex text of the backdoor key.
    pub backdoor_key: String,
    pub transcripts: Vec<Transcript>,
    pub timings: Vec<Duration>,
}

impl RunRecord {
    pub fn from_session<R: Rng>(session: &Session<R>, outcome: &SessionOutcome) -> Self {
        let params = session.params();
        Self {
            version: RUN_RECORD_VERSION,
            channel: session.config().channel,
            bit_length: params.modulus_bits(),
            p: params.p().clone(),
            q: params.q().clone(),
            g: params.g().clone(),
            secret_key: session.secret_key().as_biguint().clone(),
            public_key: session.public_key().as_biguint().clone(),
            backdoor_key: session.backdoor_key().to_hex(),
            transcripts: outcome.transcripts.clone(),
            timings: outcome.timings.clone(),
        }
    }

    /// Rebuilds the group, key pair and backdoor key, checking them against each other.
    pub fn restore(&self) -> Result<(GroupParameters, KeyPair, BackdoorKey), KleptoError> {
        let params = GroupParameters::new(self.p.clone(), self.g.clone())?;
        if params.q() != &self.q || params.modulus_bits() != self.bit_length {
            return Err(modp::GroupError::MalformedParameters(
                "stored q or bit length disagrees with p",
            )
            .into());
        }
        let keys = KeyPair::from_secret(&params, self.secret_key.clone())?;
        if keys.public_key().as_biguint() != &self.public_key {
            return Err(schnorr::SchnorrError::InvalidSecretKey.into());
        }
        let backdoor = BackdoorKey::from_hex(&self.backdoor_key)?;
        Ok((params, keys, backdoor))
    }
}

/// Somewhere to keep finished runs.
pub trait RunStore {
    fn persist(&mut self, record: &RunRecord) -> Result<RunId, StoreError>;

    fn load(&self, id: &RunId) -> Result<RunRecord, StoreError>;
}

/// Decodes a record, reading the leading version field before anything else.
fn decode_record(bytes: &[u8]) -> Result<RunRecord, StoreError> {
    let version: u32 = bincode::deserialize(bytes)?;
    if version != RUN_RECORD_VERSION {
        return Err(StoreError::UnsupportedVersion {
            found: version,
            expected: RUN_RECORD_VERSION,
        });
    }
    Ok(bincode::deserialize(bytes)?)
}

/// Runs `write` inside a freshly created run directory, removing the
/// directory again if the write fails.
fn write_or_discard(
    dir: &Path,
    write: impl FnOnce(&Path) -> io::Result<()>,
) -> Result<(), StoreError> {
    if let Err(err) = write(dir) {
        if let Err(cleanup) = fs::remove_dir_all(dir) {
            warn!(dir = %dir.display(), %cleanup, "could not remove partial run directory");
        }
        return Err(err.into());
    }
    Ok(())
}

/// One directory per run under a root directory.
#[derive(Clone, Debug)]
pub struct FsRunStore {
    root: PathBuf,
}

impl FsRunStore {
    /// Uses `root` as the parent of run directories, creating it if needed.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn run_dir(&self, id: &RunId) -> PathBuf {
        self.root.join(id.as_str())
    }

    /// Claims a fresh run directory, drawing a new id on collision.
    fn create_run_dir(&self) -> Result<(RunId, PathBuf), StoreError> {
        let mut rng = rand::rng();
        let mut last_err = None;
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = RunId::random(&mut rng);
            let dir = self.run_dir(&id);
            match fs::create_dir(&dir) {
                Ok(()) => return Ok((id, dir)),
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => last_err = Some(err),
                Err(err) => return Err(err.into()),
            }
        }
        Err(last_err
            .unwrap_or_else(|| io::Error::from(io::ErrorKind::AlreadyExists))
            .into())
    }
}

impl RunStore for FsRunStore {
    fn persist(&mut self, record: &RunRecord) -> Result<RunId, StoreError> {
        let bytes = bincode::serialize(record)?;
        let (id, dir) = self.create_run_dir()?;
        write_or_discard(&dir, |dir| fs::write(dir.join(RECORD_FILE), &bytes))?;
        debug!(run = %id, rounds = record.transcripts.len(), "persisted run");
        Ok(id)
    }

    fn load(&self, id: &RunId) -> Result<RunRecord, StoreError> {
        let path = self.run_dir(id).join(RECORD_FILE);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::UnknownRun(id.to_string()))
            }
            Err(err) => return Err(err.into()),
        };
        decode_record(&bytes)
    }
}

/// In-process store.
#[derive(Clone, Debug, Default)]
pub struct MemoryRunStore {
    runs: HashMap<RunId, Vec<u8>>,
}

impl MemoryRunStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

impl RunStore for MemoryRunStore {
    fn persist(&mut self, record: &RunRecord) -> Result<RunId, StoreError> {
        let mut rng = rand::rng();
        let mut id = RunId::random(&mut rng);
        while self.runs.contains_key(&id) {
            id = RunId::random(&mut rng);
        }
        // Encoded like the filesystem store so both see the same failures.
        self.runs.insert(id.clone(), bincode::serialize(record)?);
        Ok(id)
    }

    fn load(&self, id: &RunId) -> Result<RunRecord, StoreError> {
        let bytes = self
            .runs
            .get(id)
            .ok_or_else(|| StoreError::UnknownRun(id.to_string()))?;
        decode_record(bytes)
    }
}
