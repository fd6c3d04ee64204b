// US country settings and the two settings references every property carries
use rexml_dom::{Document, NodeId};
use shared_types::{Rule, RuleOutcome};

pub const INPUT_REFERENCE: &str = "United States - Input";
pub const OUTPUT_REFERENCE: &str = "United States - Output";

const INPUT_REFERENCE_NODE: &str = "InputCountrySettingsReference";
const OUTPUT_REFERENCE_NODE: &str = "OutputCountrySettingsReference";

pub const COUNTRY_SETTINGS_INPUT_XML: &str = concat!(
    "<CountrySettingsTable>",
    "<CountrySettingsReference>United States - Input</CountrySettingsReference>",
    "<AreaMeasurementUnit>Square Feet</AreaMeasurementUnit>",
    "<AreaMeasurementAbbreviation>SF</AreaMeasurementAbbreviation>",
    "<CurrencyName>Dollars</CurrencyName>",
    "<CurrencySymbol>$</CurrencySymbol>",
    "<SymbolPosition>Immediately Before Currency</SymbolPosition>",
    "<DecimalSymbol>Period</DecimalSymbol>",
    "<ThousandsSeparator>Comma</ThousandsSeparator>",
    "<ConversionRate BaseCurrency=\"Dollars\">1</ConversionRate>",
    "<DateFormat>MonthDayYear</DateFormat>",
    "</CountrySettingsTable>",
);

pub const COUNTRY_SETTINGS_OUTPUT_XML: &str = concat!(
    "<CountrySettingsTable>",
    "<CountrySettingsReference>United States - Output</CountrySettingsReference>",
    "<AreaMeasurementUnit>Square Feet</AreaMeasurementUnit>",
    "<AreaMeasurementAbbreviation>SqFt</AreaMeasurementAbbreviation>",
    "<CurrencyName>Dollars</CurrencyName>",
    "<CurrencySymbol>$</CurrencySymbol>",
    "<SymbolPosition>Immediately Before Currency</SymbolPosition>",
    "<DecimalSymbol>Period</DecimalSymbol>",
    "<ThousandsSeparator>Comma</ThousandsSeparator>",
    "<ConversionRate BaseCurrency=\"Dollars\">1</ConversionRate>",
    "<DateFormat>MonthDayYear</DateFormat>",
    "</CountrySettingsTable>",
);

/// Replaces the content of `CountrySettings` with the fixed input and output tables
pub fn rewrite_country_settings(doc: &mut Document, property: NodeId) -> RuleOutcome {
    let Some(settings) = doc.select_first(property, "CountrySettings") else {
        return RuleOutcome::structural(
            Rule::CountrySettings,
            format!("<CountrySettings> node not found. Searched in: {}", doc.inner_xml(property)),
        );
    };

    doc.clear_children(settings);
    let fragment = format!("{}{}", COUNTRY_SETTINGS_INPUT_XML, COUNTRY_SETTINGS_OUTPUT_XML);
    match doc.append_fragment(settings, &fragment) {
        Ok(()) => RuleOutcome::applied(Rule::CountrySettings),
        Err(e) => RuleOutcome::failed(Rule::CountrySettings, e.to_string()),
    }
}

/// Sets both settings references, creating them when absent. A created output
/// reference is placed right after the input reference.
pub fn ensure_country_references(doc: &mut Document, property: NodeId) -> RuleOutcome {
    let input = match doc.select_first(property, INPUT_REFERENCE_NODE) {
        Some(node) => node,
        None => doc.append_element(property, INPUT_REFERENCE_NODE),
    };
    doc.set_text(input, INPUT_REFERENCE);

    let output = match doc.select_first(property, OUTPUT_REFERENCE_NODE) {
        Some(node) => node,
        None => {
            let node = doc.create_element(OUTPUT_REFERENCE_NODE);
            doc.insert_after(property, node, input);
            node
        }
    };
    doc.set_text(output, OUTPUT_REFERENCE);

    RuleOutcome::applied(Rule::CountrySettingsReferences)
}
