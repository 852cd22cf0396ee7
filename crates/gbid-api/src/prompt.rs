//! GBID conversion prompt

pub const CSV_PLACEHOLDER: &str = "{{CSV_DATA}}";
pub const MATERIAL_PLACEHOLDER: &str = "{{MATERIAL_INPUT}}";

const GBID_TEMPLATE: &str = r#"You are a GBID converter. Use the following database to convert materials to GBID format.

DATABASE (CSV format):
{{CSV_DATA}}

INSTRUCTIONS:
Give me a list of GBIDs based on the following format, using my GBID database as data. If there is a footage instead of a qty, input the footage in its place (do not include measurement symbols - for example, 200' should print out as just 200). If there are multiple "cuts" or "rolls" of an item (namely wire), multiply the length by the amount of cuts/rolls to get the final qty (for example, 2 cuts of 400' of wire would become qty 800, 2 rolls of 500' would be qty 1000). Items are normally input as per item - if an item requests a number of boxes, use the properties column to determine how many qty is in each box, then output the total qty as a multiple of that. If an item has a size, such as 2" rigid conduit, search for the item first, then the size within the GBID field. Only write notes at the end of the message, do not interrupt the list. Assume standard for all parts unless specified. Use the "alternate names" column to find the closest name for items with names that do not match. Read the special notes column for all items before output to determine which part numbers are usually standard or if there are any special instructions. Read through every line and every column regardless of whether or not the item is present in the request. Search online for alternate or slang terms if necessary. Do not hallucinate part numbers if you cannot find them. If you cannot find the item after exhausting all options, write NO BID as the GBID and 1 as the QTY.

GBID[tab]QTY
GBID[tab]QTY
GBID[tab]QTY

Create the list based on this message:

{{MATERIAL_INPUT}}"#;

/// Build the prompt template cached alongside a sheet
pub fn build_template() -> String {
    GBID_TEMPLATE.to_string()
}

/// Fill the first CSV and first material placeholder of `template`.
///
/// Placeholders are located in the template only, so placeholder-like text
/// inside the CSV or the material list is left alone.
pub fn render(template: &str, csv_data: &str, material_input: &str) -> String {
    let mut material_used = false;
    let mut fill_material = |part: &str| -> String {
        if !material_used {
            if let Some((before, after)) = part.split_once(MATERIAL_PLACEHOLDER) {
                material_used = true;
                return format!("{}{}{}", before, material_input, after);
            }
        }
        part.to_string()
    };

    match template.split_once(CSV_PLACEHOLDER) {
        Some((head, tail)) => {
            let mut out = fill_material(head);
            out.push_str(csv_data);
            out.push_str(&fill_material(tail));
            out
        }
        None => fill_material(template),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_has_both_placeholders() {
        let template = build_template();
        assert_eq!(template.matches(CSV_PLACEHOLDER).count(), 1);
        assert_eq!(template.matches(MATERIAL_PLACEHOLDER).count(), 1);
        assert!(template.starts_with("You are a GBID converter."));
    }

    #[test]
    fn test_render() {
        let prompt = render(&build_template(), "GBID,Name\n100,Wire", "2 rolls of 500' wire");
        assert!(prompt.contains("DATABASE (CSV format):\nGBID,Name\n100,Wire\n"));
        assert!(prompt.ends_with("Create the list based on this message:\n\n2 rolls of 500' wire"));
        assert!(!prompt.contains(CSV_PLACEHOLDER));
        assert!(!prompt.contains(MATERIAL_PLACEHOLDER));
    }

    #[test]
    fn test_render_replaces_first_occurrence_only() {
        let prompt = render("{{CSV_DATA}}|{{CSV_DATA}}|{{MATERIAL_INPUT}}|{{MATERIAL_INPUT}}", "c", "m");
        assert_eq!(prompt, "c|{{CSV_DATA}}|m|{{MATERIAL_INPUT}}");
    }

    #[test]
    fn test_render_ignores_placeholders_in_values() {
        let prompt = render("A {{CSV_DATA}} B {{MATERIAL_INPUT}}", "{{MATERIAL_INPUT}}", "x");
        assert_eq!(prompt, "A {{MATERIAL_INPUT}} B x");
    }

    #[test]
    fn test_render_material_before_csv() {
        let prompt = render("{{MATERIAL_INPUT}} then {{CSV_DATA}}", "c", "m");
        assert_eq!(prompt, "m then c");
    }
}
