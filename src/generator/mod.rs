//! Synthetic record generation
//!
//! Produces [`Person`] documents with plausible random values for seeding
//! demo data. Partition keys are assigned by a [`PartitionStrategy`]:
//!
//! - [`PartitionStrategy::Distributed`] draws each key independently from a
//!   small fixed set, so partition sizes stay roughly even.
//! - [`PartitionStrategy::Hot`] gives every document the same key, which
//!   concentrates write load on one partition.
//!
//! # Example
//!
//! ```rust
//! use cosmos_harness::generator::{PartitionStrategy, PersonGenerator};
//!
//! let mut generator = PersonGenerator::new(PartitionStrategy::default()).with_seed(7);
//! let people = generator.generate_many(10);
//! assert_eq!(people.len(), 10);
//! ```

use crate::domain::{Address, Company, DocumentId, Geo, PartitionKeyValue, Person};
use chrono::{Duration, NaiveDate, Utc};
use fake::faker::address::en::{BuildingNumber, CityName, StateName, StreetName, ZipCode};
use fake::faker::company::en::{Bs, CatchPhrase, CompanyName};
use fake::faker::internet::en::{DomainSuffix, FreeEmailProvider, Username};
use fake::faker::name::en::{FirstName, LastName};
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Partition keys used when no explicit set is configured
pub const DEFAULT_PARTITION_KEYS: [&str; 3] = ["1", "2", "3"];

/// How generated documents are spread over partitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionStrategy {
    /// Each document draws its key uniformly from this set
    Distributed(Vec<PartitionKeyValue>),

    /// Every document gets this key
    Hot(PartitionKeyValue),
}

impl PartitionStrategy {
    /// Distributed strategy over the given values
    ///
    /// # Errors
    ///
    /// Returns an error if `values` is empty or contains an empty key.
    pub fn distributed<I, S>(values: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys = values
            .into_iter()
            .map(PartitionKeyValue::new)
            .collect::<Result<Vec<_>, _>>()?;
        if keys.is_empty() {
            return Err("At least one partition key value is required".to_string());
        }
        Ok(PartitionStrategy::Distributed(keys))
    }

    /// Hot strategy pinned to `value`
    pub fn hot(value: PartitionKeyValue) -> Self {
        PartitionStrategy::Hot(value)
    }

    /// Every key this strategy can produce
    pub fn values(&self) -> Vec<&PartitionKeyValue> {
        match self {
            PartitionStrategy::Distributed(keys) => keys.iter().collect(),
            PartitionStrategy::Hot(key) => vec![key],
        }
    }
}

impl Default for PartitionStrategy {
    fn default() -> Self {
        PartitionStrategy::Distributed(
            DEFAULT_PARTITION_KEYS
                .iter()
                .filter_map(|k| PartitionKeyValue::new(*k).ok())
                .collect(),
        )
    }
}

/// Generator of synthetic [`Person`] records
pub struct PersonGenerator {
    strategy: PartitionStrategy,
    rng: StdRng,
}

impl PersonGenerator {
    /// Create a generator seeded from OS entropy
    pub fn new(strategy: PartitionStrategy) -> Self {
        Self {
            strategy,
            rng: StdRng::from_entropy(),
        }
    }

    /// Reseed for reproducible field values
    ///
    /// Document ids stay random UUIDs regardless of the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn strategy(&self) -> &PartitionStrategy {
        &self.strategy
    }

    /// Generate one person
    pub fn generate(&mut self) -> Person {
        let id = DocumentId::generate().into_inner();
        let partition_key = self.next_partition_key();
        let rng = &mut self.rng;

        let first_name: String = FirstName().fake_with_rng(rng);
        let last_name: String = LastName().fake_with_rng(rng);
        let user_name: String = Username().fake_with_rng(rng);
        let provider: String = FreeEmailProvider().fake_with_rng(rng);
        let email = format!("{first_name}{}@{provider}", rng.gen_range(0..100));
        let phone: String = PhoneNumber().fake_with_rng(rng);
        let suffix: String = DomainSuffix().fake_with_rng(rng);

        let building: String = BuildingNumber().fake_with_rng(rng);
        let street_name: String = StreetName().fake_with_rng(rng);
        let address = Address {
            street: Some(format!("{building} {street_name}")),
            city: Some(CityName().fake_with_rng(rng)),
            state: Some(StateName().fake_with_rng(rng)),
            zip_code: Some(ZipCode().fake_with_rng(rng)),
            geo: Some(Geo {
                lat: Some(round_coordinate(rng.gen_range(-90.0..=90.0))),
                lng: Some(round_coordinate(rng.gen_range(-180.0..=180.0))),
            }),
        };

        let company = Company {
            name: Some(CompanyName().fake_with_rng(rng)),
            catch_phrase: Some(CatchPhrase().fake_with_rng(rng)),
            bs: Some(Bs().fake_with_rng(rng)),
        };

        let date_of_birth = random_date_of_birth(rng).format("%Y-%m-%d").to_string();

        Person {
            avatar: Some(format!("https://i.pravatar.cc/150?u={id}")),
            web_site: Some(format!("{}.{suffix}", user_name.to_lowercase())),
            id,
            partition_key,
            email,
            phone,
            first_name: Some(first_name),
            last_name: Some(last_name),
            user_name: Some(user_name),
            date_of_birth: Some(date_of_birth),
            address: Some(address),
            company: Some(company),
            ttl: None,
        }
    }

    /// Generate `count` people
    pub fn generate_many(&mut self, count: usize) -> Vec<Person> {
        (0..count).map(|_| self.generate()).collect()
    }

    fn next_partition_key(&mut self) -> String {
        match &self.strategy {
            PartitionStrategy::Hot(key) => key.as_str().to_string(),
            PartitionStrategy::Distributed(keys) => keys
                .choose(&mut self.rng)
                .map(|k| k.as_str().to_string())
                .unwrap_or_else(|| DEFAULT_PARTITION_KEYS[0].to_string()),
        }
    }
}

fn round_coordinate(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Birth date between 18 and 80 years ago
fn random_date_of_birth(rng: &mut StdRng) -> NaiveDate {
    let today = Utc::now().date_naive();
    let days_back = rng.gen_range(18 * 365..=80 * 365);
    today - Duration::days(days_back)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_ids_are_unique_uuids() {
        let mut generator = PersonGenerator::new(PartitionStrategy::default());
        let people = generator.generate_many(200);

        let ids: HashSet<_> = people.iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids.len(), 200);
        assert!(people
            .iter()
            .all(|p| uuid::Uuid::parse_str(&p.id).is_ok()));
    }

    #[test]
    fn test_distributed_keys_come_from_the_configured_set() {
        let mut generator = PersonGenerator::new(PartitionStrategy::default()).with_seed(1);
        let people = generator.generate_many(300);

        let seen: HashSet<_> = people.iter().map(|p| p.partition_key.as_str()).collect();
        assert!(seen.iter().all(|k| DEFAULT_PARTITION_KEYS.contains(k)));
        // 300 uniform draws over 3 values hit every value
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_hot_strategy_pins_every_key() {
        let hot = PartitionStrategy::hot(PartitionKeyValue::new("3").unwrap());
        let mut generator = PersonGenerator::new(hot);
        assert!(generator
            .generate_many(50)
            .iter()
            .all(|p| p.partition_key == "3"));
    }

    #[test]
    fn test_distributed_rejects_empty_sets() {
        assert!(PartitionStrategy::distributed(Vec::<String>::new()).is_err());
        assert!(PartitionStrategy::distributed(["a", ""]).is_err());
        let strategy = PartitionStrategy::distributed(["east", "west"]).unwrap();
        assert_eq!(strategy.values().len(), 2);
    }

    #[test]
    fn test_generated_person_is_fully_populated() {
        let mut generator = PersonGenerator::new(PartitionStrategy::default()).with_seed(42);
        let person = generator.generate();

        assert!(person.email.contains('@'));
        assert!(!person.phone.is_empty());
        assert!(person.first_name.is_some());
        assert!(person.company.as_ref().and_then(|c| c.name.as_ref()).is_some());

        let geo = person.address.as_ref().and_then(|a| a.geo).unwrap();
        assert!((-90.0..=90.0).contains(&geo.lat.unwrap()));
        assert!((-180.0..=180.0).contains(&geo.lng.unwrap()));
        assert!(person.ttl.is_none());
    }

    #[test]
    fn test_seed_reproduces_field_values() {
        let a = PersonGenerator::new(PartitionStrategy::default())
            .with_seed(9)
            .generate();
        let b = PersonGenerator::new(PartitionStrategy::default())
            .with_seed(9)
            .generate();

        assert_ne!(a.id, b.id);
        assert_eq!(a.email, b.email);
        assert_eq!(a.partition_key, b.partition_key);
        assert_eq!(a.address, b.address);
    }
}
