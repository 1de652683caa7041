//! Attack scenario documents.
//!
//! A scenario names a model file and an attacker goal. It is exported with
//! the same attribute/child rules as models (`scenario` and `assetGoal`
//! contexts).

use std::sync::Arc;

use super::model::{DEFAULT_AUTHOR, DEFAULT_VERSION, namespace};
use super::value::{Record, Value};

/// TREsPASS scenario namespace.
pub const SCENARIO_NAMESPACE: &str = "https://www.trespass-project.eu/schemas/TREsPASS_scenario";
/// Scenario schema location.
pub const SCENARIO_SCHEMA_LOCATION: &str = "https://www.trespass-project.eu/schemas/TREsPASS_scenario https://www.trespass-project.eu/schemas/TREsPASS_scenario.xsd";

/// Goal: the attacker obtains an asset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AssetGoal {
    pub attacker: Option<String>,
    pub asset: Option<String>,
    pub profit: Option<i64>,
}

/// An attack scenario.
#[derive(Clone, Debug, PartialEq)]
pub struct Scenario {
    pub xmlns: String,
    pub xmlns_xsi: String,
    pub schema_location: String,
    pub author: String,
    pub version: String,
    pub id: Option<String>,
    pub date: Option<String>,
    /// File name of the model this scenario applies to.
    pub model: Option<String>,
    pub asset_goal: AssetGoal,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::new()
    }
}

impl Scenario {
    pub fn new() -> Self {
        Self {
            xmlns: SCENARIO_NAMESPACE.to_string(),
            xmlns_xsi: namespace::XSI.to_string(),
            schema_location: SCENARIO_SCHEMA_LOCATION.to_string(),
            author: DEFAULT_AUTHOR.to_string(),
            version: DEFAULT_VERSION.to_string(),
            id: None,
            date: None,
            model: None,
            asset_goal: AssetGoal::default(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Set the model file name.
    pub fn with_model(mut self, model_file: impl Into<String>) -> Self {
        self.model = Some(model_file.into());
        self
    }

    /// Set the asset goal. `profit` defaults to 0.
    pub fn with_asset_goal(
        mut self,
        attacker: impl Into<String>,
        asset: impl Into<String>,
        profit: Option<i64>,
    ) -> Self {
        self.asset_goal = AssetGoal {
            attacker: Some(attacker.into()),
            asset: Some(asset.into()),
            profit: Some(profit.unwrap_or(0)),
        };
        self
    }

    /// Scenario as a record keyed by document field names.
    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        let mut put = |key: &str, value: Option<Value>| {
            if let Some(value) = value {
                record.insert(Arc::from(key), value);
            }
        };
        put("xmlns", Some(self.xmlns.as_str().into()));
        put("xmlns:xsi", Some(self.xmlns_xsi.as_str().into()));
        put("xsi:schemaLocation", Some(self.schema_location.as_str().into()));
        put("author", Some(self.author.as_str().into()));
        put("version", Some(self.version.as_str().into()));
        put("id", self.id.as_deref().map(Value::from));
        put("date", self.date.as_deref().map(Value::from));
        put("model", self.model.as_deref().map(Value::from));

        let goal = &self.asset_goal;
        let mut goal_record = Record::new();
        if let Some(profit) = goal.profit {
            goal_record.insert(Arc::from("profit"), Value::Integer(profit));
        }
        if let Some(attacker) = &goal.attacker {
            goal_record.insert(Arc::from("attacker"), attacker.as_str().into());
        }
        if let Some(asset) = &goal.asset {
            goal_record.insert(Arc::from("asset"), asset.as_str().into());
        }
        if !goal_record.is_empty() {
            record.insert(Arc::from("assetGoal"), Value::Record(goal_record));
        }
        record
    }
}
