// Shared fixtures for modmap integration tests
#![allow(dead_code)]

use indoc::indoc;
use modmap::{analyze_source, AnalysisReport, ModmapConfig};

/// Analyze with the default configuration, panicking on failure
pub fn analyze(source: &str) -> AnalysisReport {
    analyze_source(source, &ModmapConfig::default()).expect("analysis should succeed")
}

pub fn report_json(report: &AnalysisReport) -> String {
    serde_json::to_string(report).expect("report serializes")
}

/// Two functions that differ only in their identifiers
pub const RENAMED_TWINS: &str = indoc! {"
    import csv

    def load_users(path, limit):
        results = []
        with open(path) as handle:
            for line in handle:
                if len(results) >= limit:
                    break
                name, email = line.strip().split(',')
                results.append({'name': name, 'email': email})
        return results

    def read_people(filename, cap):
        people = []
        with open(filename) as fh:
            for row in fh:
                if len(people) >= cap:
                    break
                who, mail = row.strip().split(',')
                people.append({'name': who, 'email': mail})
        return people
"};

pub const SHOP: &str = indoc! {r#"
    """Order handling."""
    import json
    from decimal import Decimal as D

    # tax rate
    RATE = D("0.2")


    class Cart:
        def __init__(self):
            self.items = []

        def add(self, item):
            self.items.append(item)
            return self.total()

        def total(self):
            return sum(i.price for i in self.items)


    def checkout(cart):
        if not cart.items:
            return None
        return json.dumps({"total": str(cart.total() * (1 + RATE))})


    def main():
        cart = Cart()
        cart.add(object())
        print(checkout(cart))
"#};

/// A function whose body is `count` sequential `if` statements
pub fn sequential_ifs(name: &str, count: usize) -> String {
    let mut source = format!("def {name}(x):\n    total = 0\n");
    for i in 0..count {
        source.push_str(&format!("    if x > {i}:\n        total += {i}\n"));
    }
    source.push_str("    return total\n");
    source
}

/// A function whose body nests `depth` `if` statements
pub fn nested_ifs(name: &str, depth: usize) -> String {
    let mut source = format!("def {name}(x):\n");
    for level in 0..depth {
        let indent = "    ".repeat(level + 1);
        source.push_str(&format!("{indent}if x > {level}:\n"));
    }
    source.push_str(&format!("{}return x\n", "    ".repeat(depth + 1)));
    source.push_str("    return 0\n");
    source
}

/// `statements` assignments followed by `return {returns}`, so the function
/// spans `statements + 2` lines
pub fn straight_line(name: &str, statements: usize, returns: &str) -> String {
    let mut source = format!("def {name}(x):\n");
    for i in 0..statements {
        source.push_str(&format!("    v{i} = x + {i}\n"));
    }
    source.push_str(&format!("    return {returns}\n"));
    source
}

/// `count` public one-line functions named `f0`, `f1`, ...
pub fn tiny_functions(count: usize) -> String {
    (0..count)
        .map(|i| format!("def f{i}():\n    return {i}\n"))
        .collect::<Vec<_>>()
        .join("\n")
}

const STDLIB_MODULES: [&str; 12] = [
    "os", "sys", "json", "re", "math", "csv", "time", "random", "string", "shutil", "glob",
    "heapq",
];

/// A function `hub` reading one attribute from each of `count` imported modules
pub fn fan_out_hub(count: usize) -> String {
    let modules = &STDLIB_MODULES[..count];
    let mut source: String = modules.iter().map(|m| format!("import {m}\n")).collect();
    let uses: Vec<String> = modules.iter().map(|m| format!("{m}.__name__")).collect();
    source.push_str(&format!("\n\ndef hub():\n    return [{}]\n", uses.join(", ")));
    source
}

pub const SCATTERED_TOOLBOX: &str = indoc! {"
    class Toolbox:
        def hammer(self, nail):
            return nail + 1

        def saw(self, board):
            return board / 2

        def drill(self, wall):
            return wall * 3
"};
