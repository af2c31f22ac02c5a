use serde::{Deserialize, Serialize};

/// A roster entry. On the wire drivers are called unicorns.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Driver {
    pub name: String,
    pub color: String,
    pub gender: String,
}

impl Driver {
    pub fn new(name: &str, color: &str, gender: &str) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            gender: gender.into(),
        }
    }

    pub fn default_roster() -> Vec<Driver> {
        vec![
            Driver::new("Bucephalus", "Golden", "Male"),
            Driver::new("Shadowfax", "White", "Male"),
            Driver::new("Rocinante", "Yellow", "Female"),
        ]
    }
}

#[test]
fn driver_wire_format() {
    let driver = Driver::new("Shadowfax", "White", "Male");

    assert_eq!(
        serde_json::to_value(&driver).unwrap(),
        serde_json::json!({ "Name": "Shadowfax", "Color": "White", "Gender": "Male" })
    );
}
