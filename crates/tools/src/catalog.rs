//! The logistics tool catalog.
//!
//! Each entry is a named prompt template over a fixed set of typed
//! parameters. Placeholders are written `{param}` and must name a declared
//! parameter.

use serde_json::{Map, Value};
use stockpilot_core::error::ToolError;

/// The JSON type a parameter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
}

impl ParamKind {
    /// JSON Schema type name.
    pub fn schema_type(self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Integer => "integer",
        }
    }

    /// Short type name used in prompt signatures.
    pub fn signature_type(self) -> &'static str {
        match self {
            ParamKind::String => "str",
            ParamKind::Integer => "int",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
}

const fn string(name: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        kind: ParamKind::String,
    }
}

const fn integer(name: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        kind: ParamKind::Integer,
    }
}

/// Grouping used when the catalog is presented to the model or the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Operations,
    Inventory,
    SlottingPackaging,
    Workforce,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Operations,
        Category::Inventory,
        Category::SlottingPackaging,
        Category::Workforce,
    ];

    pub fn heading(self) -> &'static str {
        match self {
            Category::Operations => "Logistics & Operations",
            Category::Inventory => "Inventory Management",
            Category::SlottingPackaging => "Slotting & Packaging",
            Category::Workforce => "Training & Workforce",
        }
    }
}

/// One catalog entry.
#[derive(Debug, Clone, Copy)]
pub struct ToolSpec {
    pub name: &'static str,
    pub category: Category,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
    pub template: &'static str,
}

impl ToolSpec {
    /// `name(param: type, ...)`, as listed in the agent's system prompt.
    pub fn signature(&self) -> String {
        let params: Vec<String> = self
            .params
            .iter()
            .map(|p| format!("{}: {}", p.name, p.kind.signature_type()))
            .collect();
        format!("{}({})", self.name, params.join(", "))
    }

    /// JSON Schema for the arguments object.
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        for p in self.params {
            properties.insert(
                p.name.to_string(),
                serde_json::json!({ "type": p.kind.schema_type() }),
            );
        }
        let required: Vec<&str> = self.params.iter().map(|p| p.name).collect();
        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Check `arguments` against the declared parameters and fill the template.
    ///
    /// Unknown extra keys are ignored. Integers may arrive as JSON numbers
    /// with no fractional part.
    pub fn render(&self, arguments: &Value) -> Result<String, ToolError> {
        let empty = Map::new();
        let args = match arguments {
            Value::Object(map) => map,
            Value::Null => &empty,
            other => {
                return Err(ToolError::InvalidArguments(format!(
                    "{}: arguments must be an object, got {other}",
                    self.name
                )));
            }
        };

        let mut values = Vec::with_capacity(self.params.len());
        for p in self.params {
            let value = args.get(p.name).ok_or_else(|| {
                ToolError::InvalidArguments(format!("{}: missing '{}'", self.name, p.name))
            })?;
            let rendered = match (p.kind, value) {
                (ParamKind::String, Value::String(s)) => s.clone(),
                (ParamKind::Integer, Value::Number(n)) if n.is_i64() || n.is_u64() => n.to_string(),
                (ParamKind::Integer, Value::Number(n))
                    if n.as_f64().is_some_and(|f| f.fract() == 0.0) =>
                {
                    format!("{}", n.as_f64().unwrap_or_default() as i64)
                }
                _ => {
                    return Err(ToolError::InvalidArguments(format!(
                        "{}: '{}' must be {}, got {value}",
                        self.name,
                        p.name,
                        p.kind.schema_type()
                    )));
                }
            };
            values.push((p.name, rendered));
        }

        Ok(fill_template(self.template, &values))
    }
}

/// Substitute `{name}` placeholders in one left-to-right pass.
///
/// Substituted text is never rescanned. Braces that do not enclose a known
/// name are copied as they are.
fn fill_template(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let replacement = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, v)| (v, close))
        });
        match replacement {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Look up a catalog entry by name.
pub fn find(name: &str) -> Option<&'static ToolSpec> {
    CATALOG.iter().find(|t| t.name == name)
}

/// Entries in `category`, in catalog order.
pub fn by_category(category: Category) -> impl Iterator<Item = &'static ToolSpec> {
    CATALOG.iter().filter(move |t| t.category == category)
}

pub static CATALOG: &[ToolSpec] = &[
    // Logistics & Operations
    ToolSpec {
        name: "suggest_kpis",
        category: Category::Operations,
        description: "Suggest key performance indicators for warehouse and logistics operations.",
        params: &[],
        template: "Suggest 5 key performance indicators (KPIs) for warehouse and logistics operations.",
    },
    ToolSpec {
        name: "calculate_storage_utilization",
        category: Category::Operations,
        description: "Calculate storage utilization from total and used capacity.",
        params: &[integer("total_capacity"), integer("used_capacity")],
        template: "Calculate the storage utilization percentage when total capacity is {total_capacity} and used capacity is {used_capacity}. Provide step-by-step reasoning.",
    },
    ToolSpec {
        name: "optimize_picking_route",
        category: Category::Operations,
        description: "Suggest a picking route strategy for a warehouse zone.",
        params: &[string("zone")],
        template: "Suggest an efficient picking route strategy for a warehouse zone labeled '{zone}'. Explain your reasoning.",
    },
    ToolSpec {
        name: "layout_optimization",
        category: Category::Operations,
        description: "Suggest layout optimization strategies for a warehouse of a given size.",
        params: &[string("warehouse_size")],
        template: "Suggest layout optimization strategies for a {warehouse_size} warehouse. Please explain the rationale behind your suggestions.",
    },
    ToolSpec {
        name: "receiving_process_improvement",
        category: Category::Operations,
        description: "Suggest improvements for receiving and inbound logistics.",
        params: &[],
        template: "Suggest improvements for warehouse receiving and inbound logistics. Explain the reasoning behind your suggestions.",
    },
    ToolSpec {
        name: "warehouse_safety_checklist",
        category: Category::Operations,
        description: "Create a daily warehouse safety checklist.",
        params: &[],
        template: "Create a warehouse safety checklist for daily operations. Include reasoning for why each item is necessary.",
    },
    ToolSpec {
        name: "loading_dock_efficiency",
        category: Category::Operations,
        description: "Suggest ways to improve loading dock efficiency.",
        params: &[],
        template: "Suggest ways to improve loading dock efficiency in logistics. Provide reasoning behind your suggestions.",
    },
    ToolSpec {
        name: "identify_bottlenecks",
        category: Category::Operations,
        description: "Explain how to identify and resolve operational bottlenecks.",
        params: &[],
        template: "How can I identify and resolve bottlenecks in warehouse operations? Provide a step-by-step breakdown.",
    },
    ToolSpec {
        name: "fleet_optimization",
        category: Category::Operations,
        description: "Suggest fleet optimization strategies.",
        params: &[],
        template: "Suggest fleet optimization strategies for a logistics company. Include reasoning for each suggestion.",
    },
    // Inventory Management
    ToolSpec {
        name: "suggest_inventory_kpis",
        category: Category::Inventory,
        description: "List KPIs specific to inventory management.",
        params: &[],
        template: "List key performance indicators (KPIs) specifically for inventory management. Please explain how each KPI is relevant.",
    },
    ToolSpec {
        name: "reorder_threshold",
        category: Category::Inventory,
        description: "Determine the reorder threshold for a product.",
        params: &[string("product"), integer("daily_usage"), integer("lead_time_days")],
        template: "Determine the reorder threshold for {product} given a daily usage of {daily_usage} units and lead time of {lead_time_days} days. Please provide a step-by-step calculation.",
    },
    ToolSpec {
        name: "estimate_restock_time",
        category: Category::Inventory,
        description: "Estimate how many days current stock will last.",
        params: &[string("product"), integer("current_stock"), integer("daily_usage")],
        template: "Estimate how many days current stock of {current_stock} units for {product} will last, assuming a daily usage of {daily_usage}. Include your reasoning.",
    },
    ToolSpec {
        name: "cycle_count_strategy",
        category: Category::Inventory,
        description: "Describe an effective cycle count strategy.",
        params: &[],
        template: "What is an effective cycle count strategy for inventory control? Please explain how it ensures accuracy.",
    },
    ToolSpec {
        name: "forecast_inventory",
        category: Category::Inventory,
        description: "Forecast seasonal inventory demand for a product.",
        params: &[string("product"), string("season")],
        template: "Forecast inventory demand for {product} during the {season} season. Please explain the methodology you used to make the forecast.",
    },
    ToolSpec {
        name: "return_processing_guide",
        category: Category::Inventory,
        description: "Best practices for processing returned goods.",
        params: &[],
        template: "Provide best practices for processing returned goods in a warehouse. Explain why each practice is important.",
    },
    // Slotting & Packaging
    ToolSpec {
        name: "suggest_slotting_strategy",
        category: Category::SlottingPackaging,
        description: "Suggest a slotting strategy for a product type.",
        params: &[string("product_type")],
        template: "Suggest a warehouse slotting strategy for {product_type} products. Provide reasoning for your recommendations.",
    },
    ToolSpec {
        name: "packaging_material_advice",
        category: Category::SlottingPackaging,
        description: "Suggest packaging material for shipping a product.",
        params: &[string("product")],
        template: "Suggest optimal packaging material for shipping {product}. Please explain the factors that influence your choice.",
    },
    // Training & Workforce
    ToolSpec {
        name: "employee_training_plan",
        category: Category::Workforce,
        description: "Create a training plan for a new warehouse role.",
        params: &[string("role")],
        template: "Create a training plan for a new warehouse {role}. Provide reasoning behind the key components of the plan.",
    },
];
