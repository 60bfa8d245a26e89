use std::{collections::HashMap, str::FromStr};

use serde_json::Value;

use super::error::TypeError;

pub type FormData = HashMap<String, Value>;

pub struct Form {
    inner: HashMap<String, Value>,
}

impl Form {
    pub fn from_data(data: FormData) -> Self {
        Self { inner: data }
    }

    pub fn get_value<T>(&self, key: &str) -> Result<T, TypeError>
    where
        T: TryFrom<Value>,
    {
        match self.inner.get(key) {
            Some(value) => value
                .to_owned()
                .try_into()
                .map_err(|_e| TypeError::new("Invalid type conversion")),
            None => Err(TypeError::new("Invalid key")),
        }
    }

    pub fn get_number<T>(&self, key: &str) -> Result<T, TypeError>
    where
        T: FromStr,
    {
        match self.inner.get(key) {
            Some(value) => match value.as_str() {
                Some(v) => v
                    .to_owned()
                    .parse()
                    .map_err(|_e| TypeError::new("Invalid type conversion")),
                None => Err(TypeError::new("Failed to parse value as str")),
            },
            None => Err(TypeError::new("Invalid key")),
        }
    }

    pub fn get_str(&self, key: &str) -> Result<String, TypeError> {
        match self.inner.get(key) {
            Some(value) => match value.as_str() {
                Some(v) => Ok(v.to_string()),
                None => Err(TypeError::new("Invalid key")),
            },
            None => Err(TypeError::new("Invalid key")),
        }
    }

    pub fn get_str_list(&self, key: &str) -> Result<Vec<String>, TypeError> {
        match self.inner.get(key) {
            Some(Value::Array(values)) => values
                .iter()
                .map(|v| match v.as_str() {
                    Some(v) => Ok(v.to_string()),
                    None => Err(TypeError::new("Failed to parse value as str")),
                })
                .collect(),
            Some(_) => Err(TypeError::new("Failed to parse value as list")),
            None => Err(TypeError::new("Invalid key")),
        }
    }
}

/// One ingredient as submitted from the recipe form, identified by the
/// (title, unit) pair the product catalog is looked up with.
#[derive(Debug, Clone, PartialEq)]
pub struct IngredientDraft {
    pub title: String,
    pub unit: String,
    pub amount: f64,
}

/// A recipe submission before it is persisted. The form carries the
/// ingredient fields as three parallel lists of equal length.
#[derive(Debug, Clone)]
pub struct RecipeDraft {
    pub name: String,
    pub description: String,
    pub image: String,
    pub cook_time: i32,
    pub ingredients: Vec<IngredientDraft>,
}

impl RecipeDraft {
    pub fn from_form(form: &Form) -> Result<Self, TypeError> {
        let titles = form.get_str_list("ingredient_title")?;
        let units = form.get_str_list("ingredient_unit")?;
        let amounts = form.get_str_list("ingredient_amount")?;

        if titles.len() != units.len() || titles.len() != amounts.len() {
            return Err(TypeError::new("Mismatched ingredient field lists"));
        }

        let ingredients = titles
            .into_iter()
            .zip(units)
            .zip(amounts)
            .map(|((title, unit), amount)| {
                let amount: f64 = amount
                    .parse()
                    .map_err(|_e| TypeError::new("Invalid amount"))?;
                Ok(IngredientDraft {
                    title,
                    unit,
                    amount,
                })
            })
            .collect::<Result<Vec<IngredientDraft>, TypeError>>()?;

        Ok(Self {
            name: form.get_str("name")?,
            description: form.get_str("description")?,
            image: form.get_str("image")?,
            cook_time: form.get_number("cook_time")?,
            ingredients,
        })
    }
}
