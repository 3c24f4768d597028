mod create_branch_from_file_tree;
mod create_duplicate_branch;
