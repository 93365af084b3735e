use crate::core::{ClassCohesion, ClassRecord};

/// Score for a class that has no methods
pub const NEUTRAL_COHESION: f64 = 1.0;

/// Fraction of a class's methods that touch its own state: a receiver access
/// (`self.x`, `self.helper()`) naming a class attribute or a sibling method.
pub fn class_cohesion(class: &ClassRecord) -> ClassCohesion {
    let cohesive_methods = class
        .methods
        .iter()
        .filter(|method| {
            method.self_references.iter().any(|accessed| {
                class.attributes.contains(accessed)
                    || class
                        .methods
                        .iter()
                        .any(|sibling| sibling.name == *accessed && sibling.name != method.name)
            })
        })
        .count();

    let score = if class.methods.is_empty() {
        NEUTRAL_COHESION
    } else {
        cohesive_methods as f64 / class.methods.len() as f64
    };

    ClassCohesion {
        name: class.name.clone(),
        line: class.lines.start,
        methods: class.methods.len(),
        cohesive_methods,
        score,
    }
}

/// Mean class score, `None` when the file declares no classes
pub fn file_cohesion(classes: &[ClassCohesion]) -> Option<f64> {
    if classes.is_empty() {
        return None;
    }
    Some(classes.iter().map(|c| c.score).sum::<f64>() / classes.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::build_source_unit;
    use indoc::indoc;

    fn cohesion_of(source: &str) -> Vec<ClassCohesion> {
        let unit = build_source_unit(source).unwrap();
        unit.classes.iter().map(class_cohesion).collect()
    }

    #[test]
    fn methods_using_shared_state_are_cohesive() {
        let scores = cohesion_of(indoc! {"
            class Account:
                def __init__(self, balance):
                    self.balance = balance

                def deposit(self, amount):
                    self.balance += amount

                def describe(self):
                    return self.render()

                def render(self):
                    return 'account'

                def unrelated(self, x):
                    return x * 2
        "});
        let account = &scores[0];
        assert_eq!(account.methods, 5);
        // __init__, deposit touch balance; describe calls render
        assert_eq!(account.cohesive_methods, 3);
        assert!((account.score - 0.6).abs() < 1e-9);
    }

    #[test]
    fn empty_class_is_neutral() {
        let scores = cohesion_of("class Marker:\n    pass\n");
        assert_eq!(scores[0].score, NEUTRAL_COHESION);
        assert_eq!(file_cohesion(&scores), Some(NEUTRAL_COHESION));
    }

    #[test]
    fn no_classes_means_no_cohesion() {
        assert_eq!(file_cohesion(&[]), None);
    }
}
