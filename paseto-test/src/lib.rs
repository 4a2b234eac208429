use rand::rand_core::impls::{next_u32_via_fill, next_u64_via_fill};
use rand::rand_core::{self};
use serde::Deserialize;
use serde::de::DeserializeOwned;

pub fn read_test<Test: DeserializeOwned>(v: &str) -> TestFile<Test> {
    let path = format!("tests/vectors/{v}");
    let file = std::fs::read_to_string(path).unwrap();
    serde_json::from_str(&file).unwrap()
}

#[derive(Deserialize)]
pub struct TestFile<T> {
    pub name: String,
    pub tests: Vec<Test<T>>,
}

#[derive(Deserialize)]
pub struct Test<T> {
    pub name: String,
    #[serde(flatten)]
    pub test_data: T,
}

/// Log to the test writer, filtered by `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Debug)]
pub struct Bool<const B: bool>;

impl<'a, const B: bool> Deserialize<'a> for Bool<B> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'a>,
    {
        struct BoolVisitor<const B: bool>;

        impl<'a, const B: bool> serde::de::Visitor<'a> for BoolVisitor<B> {
            type Value = Bool<B>;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(formatter, "{B}")
            }

            fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                (v == B)
                    .then_some(Bool)
                    .ok_or_else(|| E::custom(format!("expected {B}, got {v}")))
            }
        }

        deserializer.deserialize_bool(BoolVisitor)
    }
}

#[derive(Clone, Debug)]
/// Replays fixed bytes as randomness, so sealing is reproducible.
pub struct FakeRng {
    bytes: Vec<u8>,
    start: usize,
}

impl FakeRng {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            start: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.start
    }
}

impl rand_core::RngCore for FakeRng {
    fn next_u32(&mut self) -> u32 {
        next_u32_via_fill(self)
    }

    fn next_u64(&mut self) -> u64 {
        next_u64_via_fill(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let requested = dest.len();
        if requested > self.remaining() {
            panic!("not enough entropy");
        }
        dest.copy_from_slice(&self.bytes[self.start..self.start + requested]);
        self.start += requested;
    }
}

// not really
impl rand_core::CryptoRng for FakeRng {}

/// A random source that always fails.
#[derive(Clone, Copy, Debug)]
pub struct BrokenRng;

#[derive(Debug)]
pub struct BrokenRngError;

impl std::fmt::Display for BrokenRngError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("entropy source unavailable")
    }
}

impl std::error::Error for BrokenRngError {}

impl rand_core::TryRngCore for BrokenRng {
    type Error = BrokenRngError;

    fn try_next_u32(&mut self) -> Result<u32, Self::Error> {
        Err(BrokenRngError)
    }

    fn try_next_u64(&mut self) -> Result<u64, Self::Error> {
        Err(BrokenRngError)
    }

    fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), Self::Error> {
        Err(BrokenRngError)
    }
}

impl rand_core::TryCryptoRng for BrokenRng {}

/// A single entry from one of the vector files, by name.
pub fn vector(version: &str, name: &str) -> serde_json::Value {
    let file: TestFile<serde_json::Value> = read_test(&format!("{version}.json"));
    file.tests
        .into_iter()
        .find(|test| test.name == name)
        .map(|test| test.test_data)
        .unwrap_or_else(|| panic!("no test vector named {name}"))
}

/// A hex encoded string field of a vector.
pub fn hex_field(vector: &serde_json::Value, field: &str) -> Vec<u8> {
    hex::decode(vector[field].as_str().unwrap()).unwrap()
}
