use crate::cmd::test_support::Cli;

#[test]
fn exports_json_lists_every_record() {
	let json = Cli::new("exports").fixture("items.json").json();

	assert_eq!(json["compression"], "none");
	assert_eq!(json["export_count"], 4);
	let exports = json["exports"].as_array().expect("exports array");
	assert_eq!(exports.len(), 4);
	assert_eq!(exports[0]["name"], "Potion");
	assert_eq!(exports[0]["proper"], true);
	assert_eq!(exports[3]["proper"], false);
	assert_eq!(exports[3]["property_count"], 0);
}

#[test]
fn exports_json_filters_by_type() {
	let json = Cli::new("exports").fixture("items.json").option("--type", "Weapon").json();

	let names: Vec<_> = json["exports"]
		.as_array()
		.expect("exports array")
		.iter()
		.filter_map(|row| row["name"].as_str())
		.collect();
	assert_eq!(names, ["Sword", "GreatSword"]);
}
