mod show_branch_history;
