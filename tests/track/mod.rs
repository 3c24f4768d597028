mod track_files_by_pattern;
