fn main() {
    quartz_bin::main()
}
