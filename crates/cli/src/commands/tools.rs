//! `stockpilot tools` — Print the tool catalog.

use stockpilot_tools::catalog::{Category, by_category};

pub fn run() {
    println!("Logistics tools (served by the stockpilot-mcp tool server)\n");
    for category in Category::ALL {
        println!("{}:", category.heading());
        for spec in by_category(category) {
            println!("  - {}", spec.signature());
            println!("      {}", spec.description);
        }
        println!();
    }
}
