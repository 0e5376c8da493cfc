//! Property-based tests for metric catalog construction

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use otel_metrics_simulator::config::{default_naming_rules, CountRange, GenerationConfig};
use otel_metrics_simulator::generator::{CatalogBuilder, NamingTable};
use otel_metrics_simulator::Resource;

proptest! {
    /// Catalog size always falls inside the configured range
    #[test]
    fn test_catalog_size_within_range(
        resource in "[a-z][a-z0-9-]{0,20}",
        min in 1usize..5,
        extra in 0usize..5,
        seed in any::<u64>(),
    ) {
        let config = GenerationConfig {
            metric_count: CountRange::new(min, min + extra),
            ..Default::default()
        };
        let builder = CatalogBuilder::from_config(&config);
        let mut rng = StdRng::seed_from_u64(seed);

        for _ in 0..20 {
            let catalog = builder.build(&Resource::new(resource.as_str()), &mut rng);
            prop_assert!(catalog.len() >= min && catalog.len() <= min + extra);
            for (position, descriptor) in catalog.iter().enumerate() {
                prop_assert_eq!(descriptor.index, position + 1);
            }
        }
    }

    /// Naming is total and every name is prefixed by its resource
    #[test]
    fn test_metric_names_prefixed_by_resource(
        resource in "\\PC{0,30}",
        index in 1usize..100,
    ) {
        let table = NamingTable::new(default_naming_rules());
        let name = table.metric_name(&resource, index);
        let expected_prefix = format!("{}-", resource);
        prop_assert!(name.starts_with(&expected_prefix));
    }

    /// Resources without a matching rule get indexed generic names
    #[test]
    fn test_generic_names_carry_index(
        resource in "zz[a-z]{0,10}",
        index in 1usize..100,
    ) {
        let table = NamingTable::new(default_naming_rules());
        prop_assert_eq!(table.metric_name(&resource, index), format!("{}-metric-{}", resource, index));
    }
}
