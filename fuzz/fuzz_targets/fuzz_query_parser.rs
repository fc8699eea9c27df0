#![no_main]

use libfuzzer_sys::fuzz_target;
use mer::bsp::Entity;

fuzz_target!(|input: (&str, Vec<(String, String)>)| {
    // Compiling and testing any query must not panic
    let (query, fields) = input;
    if let Some(query) = mer::query::parse_query(query) {
        let entity: Entity = fields.into_iter().collect();
        let _ = query.test_entity(&entity, 0);
    }
});
