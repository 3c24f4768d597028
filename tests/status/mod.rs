mod show_repository_status;
