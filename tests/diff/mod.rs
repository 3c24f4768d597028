mod show_line_differences;
