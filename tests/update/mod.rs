mod update_from_other_branch;
