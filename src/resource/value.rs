//! The value codec: typed in-memory values and their XML representations.
//!
//! Decoding dispatches on the element's declared kind (its `type` attribute:
//! `integer`, `boolean`, `datetime`, `array`) or inferred structure
//! (currency-tagged children become [`Money`], other child elements become a
//! nested resource decoded through the type registry, plain text stays
//! text). Encoding produces a fresh element per value.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::config::CurrencyCode;
use crate::resource::errors::DecodeError;
use crate::resource::instance::Resource;
use crate::resource::registry::TypeRegistry;
use crate::xml::Element;

/// A monetary value: an amount in cents and its currency.
///
/// On the wire a monetary field appears either as a bare integer scalar
/// (the default currency is assumed) or as one child per currency code:
///
/// ```xml
/// <unit_amount_in_cents>
///   <USD>1000</USD>
///   <EUR>800</EUR>
/// </unit_amount_in_cents>
/// ```
///
/// Decoding selects the child matching the active currency context, falling
/// back to the configured default currency, then to the first child.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Money {
    /// The amount in the currency's smallest unit.
    pub amount_in_cents: i64,
    /// The currency of the amount.
    pub currency: CurrencyCode,
}

impl Money {
    /// Creates a new monetary value.
    #[must_use]
    pub const fn new(amount_in_cents: i64, currency: CurrencyCode) -> Self {
        Self {
            amount_in_cents,
            currency,
        }
    }

    /// Decodes a monetary value from currency-tagged children.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Integer`] if the selected child's text is not
    /// an integer.
    fn from_children(
        elem: &Element,
        active_currency: Option<&str>,
        default_currency: &CurrencyCode,
    ) -> Result<Self, DecodeError> {
        let child = active_currency
            .and_then(|code| elem.find(code))
            .or_else(|| elem.find(default_currency.as_ref()))
            .or_else(|| elem.children().first());

        // Callers only dispatch here when currency children exist.
        let Some(child) = child else {
            return Err(DecodeError::Integer {
                text: String::new(),
            });
        };

        let text = child.text().unwrap_or_default();
        let amount_in_cents = text.parse().map_err(|_| DecodeError::Integer {
            text: text.to_string(),
        })?;
        let currency = CurrencyCode::new(child.tag()).map_err(|_| DecodeError::Integer {
            text: child.tag().to_string(),
        })?;

        Ok(Self {
            amount_in_cents,
            currency,
        })
    }
}

/// A decoded field value.
///
/// `Null` is an explicit null (a `nil` element or an absent timestamp) and
/// is distinct from a not-present field, which raises an
/// unsupported-attribute error at access time instead of decoding at all.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// An explicit null.
    Null,
    /// A plain string.
    Text(String),
    /// An integer (`type="integer"`).
    Int(i64),
    /// A boolean (`type="boolean"`).
    Bool(bool),
    /// A timestamp (`type="datetime"`).
    DateTime(DateTime<Utc>),
    /// A monetary amount.
    Money(Money),
    /// An ordered sequence (`type="array"`).
    List(Vec<Value>),
    /// A nested or link-resolved resource.
    Resource(Box<Resource>),
}

impl Value {
    /// Returns `true` for an explicit null.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the string content, if this is a text value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the integer content, if this is an integer value.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the boolean content, if this is a boolean value.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the timestamp content, if this is a datetime value.
    #[must_use]
    pub const fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::DateTime(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the monetary content, if this is a money value.
    #[must_use]
    pub const fn as_money(&self) -> Option<&Money> {
        match self {
            Self::Money(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the sequence content, if this is a list value.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the resource content, if this is a resource value.
    #[must_use]
    pub fn as_resource(&self) -> Option<&Resource> {
        match self {
            Self::Resource(resource) => Some(resource),
            _ => None,
        }
    }

    /// Returns the scalar text representation used when encoding.
    pub(crate) fn to_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Text(text) => text.clone(),
            Self::Int(value) => value.to_string(),
            Self::Bool(value) => value.to_string(),
            Self::DateTime(value) => value.to_rfc3339_opts(SecondsFormat::Secs, true),
            Self::Money(money) => money.amount_in_cents.to_string(),
            Self::List(_) | Self::Resource(_) => String::new(),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

impl From<Money> for Value {
    fn from(value: Money) -> Self {
        Self::Money(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::List(value)
    }
}

impl From<Resource> for Value {
    fn from(value: Resource) -> Self {
        Self::Resource(Box::new(value))
    }
}

/// Decodes an element into a typed [`Value`].
///
/// Dispatch order: explicit `nil`, then the declared `type` attribute, then
/// inferred structure (currency-tagged children, nested resource), then
/// plain text. Nested resources are decoded polymorphically through
/// `registry` and, when their schema allows, capture `active_currency` as
/// an inherited currency context.
///
/// # Errors
///
/// Returns [`DecodeError`] for malformed boolean or integer text. A missing
/// or unparseable timestamp decodes to [`Value::Null`] instead: optional
/// timestamps are common and must not block use of the rest of the entity.
pub fn value_for_element(
    registry: &TypeRegistry,
    elem: &Element,
    active_currency: Option<&str>,
    default_currency: &CurrencyCode,
) -> Result<Value, DecodeError> {
    if elem.attr("nil").is_some() {
        return Ok(Value::Null);
    }

    match elem.attr("type") {
        Some("integer") => {
            let text = elem.text().unwrap_or_default();
            let value = text.parse().map_err(|_| DecodeError::Integer {
                text: text.to_string(),
            })?;
            Ok(Value::Int(value))
        }
        Some("boolean") => match elem.text() {
            Some("true") => Ok(Value::Bool(true)),
            Some("false") => Ok(Value::Bool(false)),
            other => Err(DecodeError::Boolean {
                text: other.unwrap_or_default().to_string(),
            }),
        },
        Some("datetime") => {
            let parsed = elem
                .text()
                .and_then(|text| DateTime::parse_from_rfc3339(text).ok());
            Ok(parsed.map_or(Value::Null, |dt| Value::DateTime(dt.with_timezone(&Utc))))
        }
        Some("array") => {
            let mut items = Vec::with_capacity(elem.children().len());
            for child in elem.children() {
                items.push(value_for_element(
                    registry,
                    child,
                    active_currency,
                    default_currency,
                )?);
            }
            Ok(Value::List(items))
        }
        _ => decode_untyped(registry, elem, active_currency, default_currency),
    }
}

fn decode_untyped(
    registry: &TypeRegistry,
    elem: &Element,
    active_currency: Option<&str>,
    default_currency: &CurrencyCode,
) -> Result<Value, DecodeError> {
    if !elem.children().is_empty() {
        let all_currency_tagged = elem
            .children()
            .iter()
            .all(|child| CurrencyCode::is_currency_tag(child.tag()));
        if all_currency_tagged {
            return Money::from_children(elem, active_currency, default_currency)
                .map(Value::Money);
        }

        let mut resource = registry.hydrate(elem.clone());
        resource.set_default_currency(default_currency.clone());
        if resource.schema().inherits_currency {
            if let Some(currency) = active_currency {
                resource.inherit_currency(currency);
            }
        }
        return Ok(Value::Resource(Box::new(resource)));
    }

    Ok(Value::Text(elem.text().unwrap_or_default().to_string()))
}

/// Encodes a named value into a fresh element.
///
/// Scalars become text content; nulls a `nil` element; lists a
/// `type="array"` element whose item tag is the singular of the field name
/// (`plan_codes` becomes `plan_code`); money one currency-tagged child;
/// nested resources serialize under their own tag.
#[must_use]
pub fn element_for_value(name: &str, value: &Value) -> Element {
    match value {
        Value::Null => {
            let mut elem = Element::new(name);
            elem.set_attr("nil", "nil");
            elem
        }
        Value::Money(money) => {
            let mut elem = Element::new(name);
            elem.push(Element::with_text(
                money.currency.as_ref(),
                money.amount_in_cents.to_string(),
            ));
            elem
        }
        Value::List(items) => {
            let mut elem = Element::new(name);
            elem.set_attr("type", "array");
            let item_tag = name.strip_suffix('s').unwrap_or(name);
            for item in items {
                match item {
                    Value::Resource(resource) => elem.push(resource.to_element(false)),
                    other => elem.push(Element::with_text(item_tag, other.to_text())),
                }
            }
            elem
        }
        Value::Resource(resource) => resource.to_element(false),
        scalar => Element::with_text(name, scalar.to_text()),
    }
}
