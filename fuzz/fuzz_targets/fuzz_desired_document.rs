//! Fuzz target: `ConfigManager::load_and_apply`
//!
//! Feeds arbitrary bytes as desired documents, twice in a row on the same
//! manager, and asserts that no port ever ends up in both the fetch and
//! the watch table.
//!
//! cargo fuzz run fuzz_desired_document

#![no_main]

use diogate::pins::BankLayout;
use diogate::reconcile::ConfigManager;
use diogate::telemetry::TelemetryDictionary;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    for layout in [BankLayout::Dido, BankLayout::Dio] {
        let mut manager = ConfigManager::new(layout);
        let mut dict = TelemetryDictionary::new();

        let (head, tail) = data.split_at(data.len() / 2);
        let _ = manager.load_and_apply(head, &mut dict);
        let _ = manager.load_and_apply(tail, &mut dict);

        for item in manager.fetch_items() {
            assert!(
                manager.watch_items().iter().all(|w| w.port != item.port),
                "port both fetched and watched"
            );
        }
    }
});
