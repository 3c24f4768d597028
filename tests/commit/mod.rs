mod commit_modified_file;
mod commit_without_changes_fails;
mod switch_back_to_earlier_revision;
