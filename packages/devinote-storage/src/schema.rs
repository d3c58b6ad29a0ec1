const INIT_SQL: &str = include_str!("../../../sql/init.sql");

pub fn render_schema() -> String {
	let mut out = String::new();

	for line in INIT_SQL.lines() {
		match line.trim().strip_prefix("\\ir ").map(str::trim) {
			Some(path) => out.push_str(include_table(path).unwrap_or(line)),
			None => out.push_str(line),
		}

		out.push('\n');
	}

	out
}

fn include_table(path: &str) -> Option<&'static str> {
	let sql = match path {
		"tables/001_users.sql" => include_str!("../../../sql/tables/001_users.sql"),
		"tables/002_categories.sql" => include_str!("../../../sql/tables/002_categories.sql"),
		"tables/003_tags.sql" => include_str!("../../../sql/tables/003_tags.sql"),
		"tables/004_posts.sql" => include_str!("../../../sql/tables/004_posts.sql"),
		"tables/005_post_tags.sql" => include_str!("../../../sql/tables/005_post_tags.sql"),
		"tables/006_notes.sql" => include_str!("../../../sql/tables/006_notes.sql"),
		"tables/007_labels.sql" => include_str!("../../../sql/tables/007_labels.sql"),
		"tables/008_note_labels.sql" => include_str!("../../../sql/tables/008_note_labels.sql"),
		"tables/009_note_shares.sql" => include_str!("../../../sql/tables/009_note_shares.sql"),
		"tables/010_label_shares.sql" => include_str!("../../../sql/tables/010_label_shares.sql"),
		_ => return None,
	};

	Some(sql)
}
